use crate::model::{generate_id, null_as_default, Id, MeetingSummary};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Persisted calendar: scalar fields plus meeting identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meetings: Vec<Id>,
}

impl CalendarSummary {
    pub fn new(title: String, details: String) -> Self {
        Self {
            id: generate_id(),
            title,
            details,
            meetings: Vec::new(),
        }
    }

    /// Fill in a server-generated id when the caller did not supply one and
    /// drop duplicate meeting ids.
    pub fn normalized(mut self) -> Self {
        if self.id.is_empty() {
            self.id = generate_id();
        }
        self.meetings = self.meetings.into_iter().unique().collect();
        self
    }
}

/// Calendar as returned to clients, with meetings resolved from the meeting
/// registry. Embedded meetings stay in their summary shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: Id,
    pub title: String,
    pub details: String,
    pub meetings: Vec<MeetingSummary>,
}

/// Scalar fields a calendar update may replace. Anything else in the
/// request body (id, meetings) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarUpdate {
    pub title: Option<String>,
    pub details: Option<String>,
}

impl CalendarUpdate {
    pub fn apply_to(&self, calendar: &mut CalendarSummary) {
        if let Some(title) = &self.title {
            calendar.title = title.clone();
        }
        if let Some(details) = &self.details {
            calendar.details = details.clone();
        }
    }
}

/// Relationship arrays on a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarRelation {
    Meetings,
}

impl CalendarRelation {
    pub fn field(&self) -> &'static str {
        match self {
            CalendarRelation::Meetings => "meetings",
        }
    }

    pub fn values_mut<'a>(&self, calendar: &'a mut CalendarSummary) -> &'a mut Vec<Id> {
        match self {
            CalendarRelation::Meetings => &mut calendar.meetings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_generates_missing_id() {
        let summary: CalendarSummary =
            serde_json::from_str(r#"{"title": "Team", "details": "shared"}"#).unwrap();
        assert!(summary.id.is_empty());
        assert!(summary.meetings.is_empty());

        let summary = summary.normalized();
        assert!(!summary.id.is_empty());
    }

    #[test]
    fn test_normalized_keeps_supplied_id_and_dedupes() {
        let summary = CalendarSummary {
            id: "cal-1".to_string(),
            title: "Team".to_string(),
            details: String::new(),
            meetings: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        }
        .normalized();

        assert_eq!(summary.id, "cal-1");
        assert_eq!(summary.meetings, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_update_ignores_non_scalar_fields() {
        let update: CalendarUpdate = serde_json::from_str(
            r#"{"id": "other", "title": "Renamed", "meetings": ["x"]}"#,
        )
        .unwrap();

        let mut calendar = CalendarSummary::new("Old".to_string(), "keep".to_string());
        calendar.meetings.push("m1".to_string());
        let id = calendar.id.clone();
        update.apply_to(&mut calendar);

        assert_eq!(calendar.id, id);
        assert_eq!(calendar.title, "Renamed");
        assert_eq!(calendar.details, "keep");
        assert_eq!(calendar.meetings, vec!["m1".to_string()]);
    }
}
