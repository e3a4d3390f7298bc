use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Relationship identifiers must be UUIDs. Record ids themselves may be
/// caller-supplied and are not checked here.
pub fn is_valid_id(candidate: &str) -> bool {
    Uuid::parse_str(candidate).is_ok()
}

/// Returns the first identifier that is not a well-formed UUID.
pub fn first_invalid_id(ids: &[Id]) -> Option<&Id> {
    ids.iter().find(|id| !is_valid_id(id))
}

/// Reads an explicit `null` as the type's default. Pair with
/// `#[serde(default)]` to also accept a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Entity kinds served by this registry and its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Calendars,
    Meetings,
    Participants,
    Attachments,
}

impl EntityKind {
    /// Collection name, used both as the REST resource path and table name.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Calendars => "calendars",
            EntityKind::Meetings => "meetings",
            EntityKind::Participants => "participants",
            EntityKind::Attachments => "attachments",
        }
    }

    /// Human readable singular, for messages.
    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Calendars => "calendar",
            EntityKind::Meetings => "meeting",
            EntityKind::Participants => "participant",
            EntityKind::Attachments => "attachment",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}
