use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize};

use crate::model::{
    null_as_default, Attachment, CalendarSummary, EntityKind, Id, MeetingSummary, Participant,
};
use crate::peer::resolver::{PeerResolver, Resolution};

/// Sibling registries answer either with a bare array or with the
/// `{"data": [...]}` envelope; some encode "nothing" as `null`. An object
/// without a `data` key does not decode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PeerPayload<T> {
    Bare(Vec<T>),
    Enveloped {
        #[serde(deserialize_with = "null_as_default")]
        data: Vec<T>,
    },
    Null,
}

impl<T> PeerPayload<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            PeerPayload::Bare(items) => items,
            PeerPayload::Enveloped { data } => data,
            PeerPayload::Null => Vec::new(),
        }
    }
}

/// Looks up sibling records with `GET {base_url}/{collection}?ids=a,b,c`.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    client: HttpClient,
    base_url: String,
}

impl HttpPeerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One request per call, every id in a single comma-separated `ids`
    /// parameter. Never fails; problems come back as `Degraded`.
    pub async fn fetch_by_ids<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        ids: &[Id],
    ) -> Resolution<T> {
        if ids.is_empty() {
            return Resolution::empty();
        }

        let url = format!("{}/{}", self.base_url, kind.collection());
        let joined = ids.join(",");

        let response = match self
            .client
            .get(&url)
            .query(&[("ids", joined.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Lookup of {} failed: {}", kind, e);
                return Resolution::degraded(format!("request to {} failed: {}", url, e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("Lookup of {} returned {}", kind, status);
            return Resolution::degraded(format!("{} answered {}", url, status));
        }

        match response.json::<PeerPayload<T>>().await {
            Ok(payload) => {
                let items = payload.into_items();
                log::debug!("Resolved {} of {} {}", items.len(), ids.len(), kind);
                Resolution::Resolved(items)
            }
            Err(e) => {
                log::warn!("Could not decode {} lookup: {}", kind, e);
                Resolution::degraded(format!("undecodable response from {}: {}", url, e))
            }
        }
    }
}

#[async_trait::async_trait]
impl PeerResolver for HttpPeerClient {
    async fn calendars(&self, ids: &[Id]) -> Resolution<CalendarSummary> {
        self.fetch_by_ids(EntityKind::Calendars, ids).await
    }

    async fn meetings(&self, ids: &[Id]) -> Resolution<MeetingSummary> {
        self.fetch_by_ids(EntityKind::Meetings, ids).await
    }

    async fn participants(&self, ids: &[Id]) -> Resolution<Participant> {
        self.fetch_by_ids(EntityKind::Participants, ids).await
    }

    async fn attachments(&self, ids: &[Id]) -> Resolution<Attachment> {
        self.fetch_by_ids(EntityKind::Attachments, ids).await
    }
}
