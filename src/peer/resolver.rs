use crate::model::{Attachment, CalendarSummary, Id, MeetingSummary, Participant};

/// Outcome of a sibling-registry lookup.
///
/// Lookups are best effort: a failed lookup reads as an empty list through
/// [`Resolution::into_items`], but stays distinguishable from a lookup that
/// genuinely found nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Resolved(Vec<T>),
    Degraded { reason: String },
}

impl<T> Resolution<T> {
    pub fn empty() -> Self {
        Resolution::Resolved(Vec::new())
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Resolution::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Degraded { .. })
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Resolution::Resolved(items) => items,
            Resolution::Degraded { .. } => Vec::new(),
        }
    }
}

/// Fetches records owned by sibling registries.
#[async_trait::async_trait]
pub trait PeerResolver: Send + Sync {
    async fn calendars(&self, ids: &[Id]) -> Resolution<CalendarSummary>;
    async fn meetings(&self, ids: &[Id]) -> Resolution<MeetingSummary>;
    async fn participants(&self, ids: &[Id]) -> Resolution<Participant>;
    async fn attachments(&self, ids: &[Id]) -> Resolution<Attachment>;
}
