use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{parse_meeting_datetime, Calendar, CalendarSummary, Meeting, MeetingSummary};
use crate::peer::{PeerResolver, Resolution};

/// Turns persisted summaries into the full representations served to
/// clients, resolving foreign ids through the sibling registries.
#[derive(Clone)]
pub struct Expander {
    peers: Arc<dyn PeerResolver>,
}

impl Expander {
    pub fn new(peers: Arc<dyn PeerResolver>) -> Self {
        Self { peers }
    }

    pub async fn expand_calendar(&self, summary: CalendarSummary) -> Calendar {
        let meetings = if summary.meetings.is_empty() {
            Vec::new()
        } else {
            settle("meetings", &summary.id, self.peers.meetings(&summary.meetings).await)
        };

        Calendar {
            id: summary.id,
            title: summary.title,
            details: summary.details,
            meetings,
        }
    }

    pub async fn expand_meeting(&self, summary: MeetingSummary) -> Meeting {
        let calendars = async {
            if summary.calendars.is_empty() {
                return Vec::new();
            }
            settle("calendars", &summary.id, self.peers.calendars(&summary.calendars).await)
        };
        let participants = async {
            if summary.participants.is_empty() {
                return Vec::new();
            }
            settle(
                "participants",
                &summary.id,
                self.peers.participants(&summary.participants).await,
            )
        };
        let attachments = async {
            if summary.attachments.is_empty() {
                return Vec::new();
            }
            settle(
                "attachments",
                &summary.id,
                self.peers.attachments(&summary.attachments).await,
            )
        };
        let (calendars, participants, attachments) =
            tokio::join!(calendars, participants, attachments);

        let datetime = meeting_datetime_or_now(&summary.id, &summary.datetime);

        Meeting {
            id: summary.id,
            title: summary.title,
            details: summary.details,
            datetime,
            location: summary.location,
            calendars,
            participants,
            attachments,
        }
    }

    pub async fn expand_calendars(&self, summaries: Vec<CalendarSummary>) -> Vec<Calendar> {
        futures::future::join_all(summaries.into_iter().map(|s| self.expand_calendar(s))).await
    }

    pub async fn expand_meetings(&self, summaries: Vec<MeetingSummary>) -> Vec<Meeting> {
        futures::future::join_all(summaries.into_iter().map(|s| self.expand_meeting(s))).await
    }
}

/// Degraded lookups still expand, to an empty list.
fn settle<T>(field: &str, owner: &str, resolution: Resolution<T>) -> Vec<T> {
    if let Resolution::Degraded { reason } = &resolution {
        log::warn!("Expanding {} of {} without related records: {}", field, owner, reason);
    }
    resolution.into_items()
}

/// Stored date-times that do not match the meeting layout are replaced by
/// the current time.
fn meeting_datetime_or_now(owner: &str, text: &str) -> DateTime<Utc> {
    parse_meeting_datetime(text).unwrap_or_else(|| {
        log::debug!("Meeting {} has unparseable datetime {:?}", owner, text);
        Utc::now()
    })
}
