use crate::model::{generate_id, null_as_default, Attachment, CalendarSummary, Id, Participant};
use chrono::{DateTime, NaiveDateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Layout of the persisted meeting date-time, e.g. `2024-03-01 10:00 AM`.
pub const MEETING_DATETIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Parse a stored meeting date-time. The text carries no zone and is read
/// as UTC.
pub fn parse_meeting_datetime(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), MEETING_DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Persisted meeting: scalar fields plus foreign identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub datetime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calendars: Vec<Id>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<Id>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<Id>,
}

impl MeetingSummary {
    pub fn new(title: String, details: String, datetime: String, location: String) -> Self {
        Self {
            id: generate_id(),
            title,
            details,
            datetime,
            location,
            calendars: Vec::new(),
            participants: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn normalized(mut self) -> Self {
        if self.id.is_empty() {
            self.id = generate_id();
        }
        for relation in MeetingRelation::ALL {
            let values = relation.values_mut(&mut self);
            *values = std::mem::take(values).into_iter().unique().collect();
        }
        self
    }

    pub fn relation(&self, relation: MeetingRelation) -> &[Id] {
        match relation {
            MeetingRelation::Calendars => &self.calendars,
            MeetingRelation::Participants => &self.participants,
            MeetingRelation::Attachments => &self.attachments,
        }
    }
}

/// Meeting as returned to clients, with related entities resolved from
/// their registries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Id,
    pub title: String,
    pub details: String,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub calendars: Vec<CalendarSummary>,
    pub participants: Vec<Participant>,
    pub attachments: Vec<Attachment>,
}

/// Scalar fields a meeting update may replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub details: Option<String>,
    pub location: Option<String>,
    pub datetime: Option<String>,
}

impl MeetingUpdate {
    pub fn apply_to(&self, meeting: &mut MeetingSummary) {
        if let Some(title) = &self.title {
            meeting.title = title.clone();
        }
        if let Some(details) = &self.details {
            meeting.details = details.clone();
        }
        if let Some(location) = &self.location {
            meeting.location = location.clone();
        }
        if let Some(datetime) = &self.datetime {
            meeting.datetime = datetime.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingRelation {
    Calendars,
    Participants,
    Attachments,
}

impl MeetingRelation {
    pub const ALL: [MeetingRelation; 3] = [
        MeetingRelation::Calendars,
        MeetingRelation::Participants,
        MeetingRelation::Attachments,
    ];

    pub fn field(&self) -> &'static str {
        match self {
            MeetingRelation::Calendars => "calendars",
            MeetingRelation::Participants => "participants",
            MeetingRelation::Attachments => "attachments",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            MeetingRelation::Calendars => "calendar",
            MeetingRelation::Participants => "participant",
            MeetingRelation::Attachments => "attachment",
        }
    }

    pub fn values_mut<'a>(&self, meeting: &'a mut MeetingSummary) -> &'a mut Vec<Id> {
        match self {
            MeetingRelation::Calendars => &mut meeting.calendars,
            MeetingRelation::Participants => &mut meeting.participants,
            MeetingRelation::Attachments => &mut meeting.attachments,
        }
    }
}
