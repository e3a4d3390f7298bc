#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use registry::routes::{create_calendar_router, create_meeting_router};
use registry::{
    AppState, Attachment, CalendarSummary, Id, MeetingSummary, MemoryStore, Participant,
    PeerResolver, Resolution,
};

/// Sibling registries backed by fixed lists. Unknown ids resolve to nothing.
#[derive(Default)]
pub struct StubPeers {
    pub calendars: Vec<CalendarSummary>,
    pub meetings: Vec<MeetingSummary>,
    pub participants: Vec<Participant>,
    pub attachments: Vec<Attachment>,
    pub calls: AtomicUsize,
}

impl StubPeers {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn pick<T: Clone>(&self, items: &[T], ids: &[Id], id_of: fn(&T) -> &Id) -> Resolution<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Resolution::Resolved(
            items
                .iter()
                .filter(|item| ids.contains(id_of(item)))
                .cloned()
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl PeerResolver for StubPeers {
    async fn calendars(&self, ids: &[Id]) -> Resolution<CalendarSummary> {
        self.pick(&self.calendars, ids, |c| &c.id)
    }

    async fn meetings(&self, ids: &[Id]) -> Resolution<MeetingSummary> {
        self.pick(&self.meetings, ids, |m| &m.id)
    }

    async fn participants(&self, ids: &[Id]) -> Resolution<Participant> {
        self.pick(&self.participants, ids, |p| &p.id)
    }

    async fn attachments(&self, ids: &[Id]) -> Resolution<Attachment> {
        self.pick(&self.attachments, ids, |a| &a.id)
    }
}

pub fn calendar_app(peers: Arc<StubPeers>) -> Router {
    create_calendar_router::<MemoryStore>()
        .with_state(AppState::new(Arc::new(MemoryStore::new()), peers))
}

pub fn meeting_app(peers: Arc<StubPeers>) -> Router {
    create_meeting_router::<MemoryStore>()
        .with_state(AppState::new(Arc::new(MemoryStore::new()), peers))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|err| panic!("failed to build request: {err}"));

    send_request(app, request).await
}

pub async fn send_raw(app: &Router, method: &str, uri: &str, raw: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .unwrap_or_else(|err| panic!("failed to build request: {err}"));

    send_request(app, request).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match app.clone().oneshot(request).await {
        Ok(response) => response,
        Err(err) => panic!("router request failed: {err}"),
    };
    let status = response.status();
    let bytes = match axum::body::to_bytes(response.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => panic!(
                "response body is not JSON: {err}; body={}",
                String::from_utf8_lossy(&bytes)
            ),
        }
    };
    (status, value)
}

pub fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap_or_else(|| panic!("expected array, got {value}"))
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect()
}
