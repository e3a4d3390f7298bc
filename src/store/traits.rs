use crate::model::{
    CalendarRelation, CalendarSummary, CalendarUpdate, Id, MeetingRelation, MeetingSummary,
    MeetingUpdate,
};
use anyhow::Result;

/// Persistence for calendar summaries.
///
/// `Ok(None)` and `Ok(false)` mean no record matched the id; `Err` is
/// reserved for storage failures.
#[async_trait::async_trait]
pub trait CalendarStore: Send + Sync {
    async fn list_calendars(&self) -> Result<Vec<CalendarSummary>>;
    async fn list_calendars_by_ids(&self, ids: &[Id]) -> Result<Vec<CalendarSummary>>;
    async fn get_calendar(&self, id: &Id) -> Result<Option<CalendarSummary>>;
    /// Fails if a calendar with the same id already exists.
    async fn insert_calendar(&self, calendar: CalendarSummary) -> Result<CalendarSummary>;
    async fn update_calendar(
        &self,
        id: &Id,
        update: &CalendarUpdate,
    ) -> Result<Option<CalendarSummary>>;
    /// Set-union insert; values already present are left alone.
    async fn add_to_calendar(
        &self,
        id: &Id,
        relation: CalendarRelation,
        values: &[Id],
    ) -> Result<Option<CalendarSummary>>;
    /// Removes every occurrence of each value.
    async fn remove_from_calendar(
        &self,
        id: &Id,
        relation: CalendarRelation,
        values: &[Id],
    ) -> Result<Option<CalendarSummary>>;
    async fn delete_calendar(&self, id: &Id) -> Result<bool>;
}

/// Persistence for meeting summaries, same conventions as [`CalendarStore`].
#[async_trait::async_trait]
pub trait MeetingStore: Send + Sync {
    async fn list_meetings(&self) -> Result<Vec<MeetingSummary>>;
    async fn list_meetings_by_ids(&self, ids: &[Id]) -> Result<Vec<MeetingSummary>>;
    async fn get_meeting(&self, id: &Id) -> Result<Option<MeetingSummary>>;
    async fn insert_meeting(&self, meeting: MeetingSummary) -> Result<MeetingSummary>;
    async fn update_meeting(
        &self,
        id: &Id,
        update: &MeetingUpdate,
    ) -> Result<Option<MeetingSummary>>;
    async fn add_to_meeting(
        &self,
        id: &Id,
        relation: MeetingRelation,
        values: &[Id],
    ) -> Result<Option<MeetingSummary>>;
    async fn remove_from_meeting(
        &self,
        id: &Id,
        relation: MeetingRelation,
        values: &[Id],
    ) -> Result<Option<MeetingSummary>>;
    async fn delete_meeting(&self, id: &Id) -> Result<bool>;
}

pub trait Store: CalendarStore + MeetingStore + Send + Sync {}

impl<T: CalendarStore + MeetingStore + Send + Sync> Store for T {}
