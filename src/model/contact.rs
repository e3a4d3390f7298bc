use crate::model::Id;
use serde::{Deserialize, Serialize};

/// Participant record owned by the participants registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Attachment record owned by the attachments registry, which names its
/// fields `attachmentsId` and `attachmentUrl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(alias = "attachmentsId")]
    pub id: Id,
    #[serde(default, alias = "attachmentUrl")]
    pub url: String,
}
