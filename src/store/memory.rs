use anyhow::{anyhow, Result};
use parking_lot::RwLock;

use crate::model::{
    CalendarRelation, CalendarSummary, CalendarUpdate, Id, MeetingRelation, MeetingSummary,
    MeetingUpdate,
};
use crate::store::traits::{CalendarStore, MeetingStore};

/// In-process store with the same semantics as [`crate::store::PostgresStore`].
/// Records keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    calendars: RwLock<Vec<CalendarSummary>>,
    meetings: RwLock<Vec<MeetingSummary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Append values not already present, keeping request order.
fn add_to_set(target: &mut Vec<Id>, values: &[Id]) {
    for value in values {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}

fn pull_all(target: &mut Vec<Id>, values: &[Id]) {
    target.retain(|existing| !values.contains(existing));
}

#[async_trait::async_trait]
impl CalendarStore for MemoryStore {
    async fn list_calendars(&self) -> Result<Vec<CalendarSummary>> {
        Ok(self.calendars.read().clone())
    }

    async fn list_calendars_by_ids(&self, ids: &[Id]) -> Result<Vec<CalendarSummary>> {
        Ok(self
            .calendars
            .read()
            .iter()
            .filter(|calendar| ids.contains(&calendar.id))
            .cloned()
            .collect())
    }

    async fn get_calendar(&self, id: &Id) -> Result<Option<CalendarSummary>> {
        Ok(self.calendars.read().iter().find(|c| &c.id == id).cloned())
    }

    async fn insert_calendar(&self, calendar: CalendarSummary) -> Result<CalendarSummary> {
        let calendar = calendar.normalized();
        let mut calendars = self.calendars.write();
        if calendars.iter().any(|c| c.id == calendar.id) {
            return Err(anyhow!("calendar '{}' already exists", calendar.id));
        }
        calendars.push(calendar.clone());
        Ok(calendar)
    }

    async fn update_calendar(
        &self,
        id: &Id,
        update: &CalendarUpdate,
    ) -> Result<Option<CalendarSummary>> {
        let mut calendars = self.calendars.write();
        Ok(calendars.iter_mut().find(|c| &c.id == id).map(|calendar| {
            update.apply_to(calendar);
            calendar.clone()
        }))
    }

    async fn add_to_calendar(
        &self,
        id: &Id,
        relation: CalendarRelation,
        values: &[Id],
    ) -> Result<Option<CalendarSummary>> {
        let mut calendars = self.calendars.write();
        Ok(calendars.iter_mut().find(|c| &c.id == id).map(|calendar| {
            add_to_set(relation.values_mut(calendar), values);
            calendar.clone()
        }))
    }

    async fn remove_from_calendar(
        &self,
        id: &Id,
        relation: CalendarRelation,
        values: &[Id],
    ) -> Result<Option<CalendarSummary>> {
        let mut calendars = self.calendars.write();
        Ok(calendars.iter_mut().find(|c| &c.id == id).map(|calendar| {
            pull_all(relation.values_mut(calendar), values);
            calendar.clone()
        }))
    }

    async fn delete_calendar(&self, id: &Id) -> Result<bool> {
        let mut calendars = self.calendars.write();
        let before = calendars.len();
        calendars.retain(|c| &c.id != id);
        Ok(calendars.len() < before)
    }
}

#[async_trait::async_trait]
impl MeetingStore for MemoryStore {
    async fn list_meetings(&self) -> Result<Vec<MeetingSummary>> {
        Ok(self.meetings.read().clone())
    }

    async fn list_meetings_by_ids(&self, ids: &[Id]) -> Result<Vec<MeetingSummary>> {
        Ok(self
            .meetings
            .read()
            .iter()
            .filter(|meeting| ids.contains(&meeting.id))
            .cloned()
            .collect())
    }

    async fn get_meeting(&self, id: &Id) -> Result<Option<MeetingSummary>> {
        Ok(self.meetings.read().iter().find(|m| &m.id == id).cloned())
    }

    async fn insert_meeting(&self, meeting: MeetingSummary) -> Result<MeetingSummary> {
        let meeting = meeting.normalized();
        let mut meetings = self.meetings.write();
        if meetings.iter().any(|m| m.id == meeting.id) {
            return Err(anyhow!("meeting '{}' already exists", meeting.id));
        }
        meetings.push(meeting.clone());
        Ok(meeting)
    }

    async fn update_meeting(
        &self,
        id: &Id,
        update: &MeetingUpdate,
    ) -> Result<Option<MeetingSummary>> {
        let mut meetings = self.meetings.write();
        Ok(meetings.iter_mut().find(|m| &m.id == id).map(|meeting| {
            update.apply_to(meeting);
            meeting.clone()
        }))
    }

    async fn add_to_meeting(
        &self,
        id: &Id,
        relation: MeetingRelation,
        values: &[Id],
    ) -> Result<Option<MeetingSummary>> {
        let mut meetings = self.meetings.write();
        Ok(meetings.iter_mut().find(|m| &m.id == id).map(|meeting| {
            add_to_set(relation.values_mut(meeting), values);
            meeting.clone()
        }))
    }

    async fn remove_from_meeting(
        &self,
        id: &Id,
        relation: MeetingRelation,
        values: &[Id],
    ) -> Result<Option<MeetingSummary>> {
        let mut meetings = self.meetings.write();
        Ok(meetings.iter_mut().find(|m| &m.id == id).map(|meeting| {
            pull_all(relation.values_mut(meeting), values);
            meeting.clone()
        }))
    }

    async fn delete_meeting(&self, id: &Id) -> Result<bool> {
        let mut meetings = self.meetings.write();
        let before = meetings.len();
        meetings.retain(|m| &m.id != id);
        Ok(meetings.len() < before)
    }
}
