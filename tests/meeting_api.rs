mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use common::{meeting_app, send, strings, StubPeers};
use registry::{generate_id, is_valid_id, Attachment, CalendarSummary, Participant};

fn sync_meeting() -> Value {
    json!({
        "title": "Sync",
        "details": "weekly",
        "datetime": "2024-03-01 10:00 AM",
        "location": "room 1",
        "calendars": [],
        "participants": [],
        "attachments": []
    })
}

async fn create(app: &axum::Router, body: Value) -> String {
    let (status, created) = send(app, "POST", "/meetings", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_then_list_by_ids_round_trip() {
    let app = meeting_app(Arc::new(StubPeers::default()));

    let (status, created) = send(&app, "POST", "/meetings", Some(sync_meeting())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert!(is_valid_id(&id));

    let (status, body) = send(&app, "GET", &format!("/meetings?ids={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let meeting = &body["data"][0];
    assert_eq!(meeting["id"], id.as_str());
    assert_eq!(meeting["title"], "Sync");
    assert_eq!(meeting["details"], "weekly");
    assert_eq!(meeting["datetime"], "2024-03-01 10:00 AM");
    assert_eq!(meeting["location"], "room 1");
    assert_eq!(meeting["calendars"], json!([]));
    assert_eq!(meeting["participants"], json!([]));
    assert_eq!(meeting["attachments"], json!([]));
}

#[tokio::test]
async fn test_expansion_resolves_each_relation() {
    let calendar = CalendarSummary::new("Team".to_string(), "shared".to_string());
    let participant = Participant {
        id: generate_id(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let attachment = Attachment {
        id: generate_id(),
        url: "https://files.example.com/agenda.pdf".to_string(),
    };
    let peers = Arc::new(StubPeers {
        calendars: vec![calendar.clone()],
        participants: vec![participant.clone()],
        attachments: vec![attachment.clone()],
        ..Default::default()
    });
    let app = meeting_app(peers.clone());

    let mut body = sync_meeting();
    body["calendars"] = json!([calendar.id]);
    body["participants"] = json!([participant.id]);
    body["attachments"] = json!([attachment.id]);
    let id = create(&app, body).await;

    let (status, body) = send(&app, "GET", &format!("/meetings/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let meeting = &body["data"];
    assert_eq!(meeting["calendars"][0]["title"], "Team");
    assert_eq!(meeting["participants"][0]["email"], "ada@example.com");
    assert_eq!(meeting["attachments"][0]["url"], attachment.url.as_str());
    assert_eq!(meeting["datetime"], "2024-03-01T10:00:00Z");
    assert_eq!(peers.call_count(), 3);

    let (_, body) = send(&app, "GET", "/meetings", None).await;
    assert_eq!(body["data"][0]["participants"][0]["name"], "Ada");
}

#[tokio::test]
async fn test_empty_relations_do_not_call_peers() {
    let peers = Arc::new(StubPeers::default());
    let app = meeting_app(peers.clone());
    let id = create(&app, sync_meeting()).await;

    let (status, body) = send(&app, "GET", &format!("/meetings/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["calendars"], json!([]));
    assert_eq!(body["data"]["participants"], json!([]));
    assert_eq!(body["data"]["attachments"], json!([]));
    assert_eq!(peers.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_datetime_expands_to_now() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let mut body = sync_meeting();
    body["datetime"] = json!("first thing monday");
    let id = create(&app, body).await;

    let before = Utc::now() - chrono::Duration::seconds(1);
    let (status, body) = send(&app, "GET", &format!("/meetings/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let expanded: DateTime<Utc> = body["data"]["datetime"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(expanded >= before);
    assert!(expanded <= Utc::now() + chrono::Duration::seconds(1));
}

#[tokio::test]
async fn test_unknown_participant_is_stored_but_expands_empty() {
    let peers = Arc::new(StubPeers::default());
    let app = meeting_app(peers.clone());
    let id = create(&app, sync_meeting()).await;
    let stranger = generate_id();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/meetings/{}/addParticipants", id),
        Some(json!({"participants": [stranger]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["participants"], json!([]));
    assert_eq!(peers.call_count(), 1);

    let (_, body) = send(&app, "GET", &format!("/meetings?ids={}", id), None).await;
    assert_eq!(strings(&body["data"][0]["participants"]), vec![stranger]);
}

#[tokio::test]
async fn test_malformed_participant_id_aborts_without_mutation() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let existing = generate_id();
    let mut body = sync_meeting();
    body["participants"] = json!([existing]);
    let id = create(&app, body).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/meetings/{}/addParticipants", id),
        Some(json!({"participants": [generate_id(), "participant-two", generate_id()]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid participant ID: participant-two");

    let (_, body) = send(&app, "GET", &format!("/meetings?ids={}", id), None).await;
    assert_eq!(strings(&body["data"][0]["participants"]), vec![existing]);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/meetings/{}/removeAttachments", id),
        Some(json!({"attachments": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No attachments provided");
}

#[tokio::test]
async fn test_add_twice_then_remove_restores_attachments() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let id = create(&app, sync_meeting()).await;
    let by_ids = format!("/meetings?ids={}", id);
    let attachment = generate_id();

    // The attachments registry's callback shape
    let (status, _) = send(
        &app,
        "POST",
        &format!("/meetings/{}/attachments", id),
        Some(json!({"attachmentsId": attachment})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/meetings/{}/addAttachment/{}", id, attachment),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &by_ids, None).await;
    assert_eq!(strings(&body["data"][0]["attachments"]), vec![attachment.clone()]);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/meetings/{}/removeAttachments", id),
        Some(json!([attachment])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &by_ids, None).await;
    assert_eq!(body["data"][0]["attachments"], json!([]));
}

#[tokio::test]
async fn test_calendar_links_by_path() {
    let calendar = CalendarSummary::new("Team".to_string(), String::new());
    let peers = Arc::new(StubPeers {
        calendars: vec![calendar.clone()],
        ..Default::default()
    });
    let app = meeting_app(peers);
    let id = create(&app, sync_meeting()).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/meetings/{}/addCalendar/{}", id, calendar.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["calendars"][0]["id"], calendar.id.as_str());

    let (status, body) = send(
        &app,
        "GET",
        &format!("/meetings/{}/removeCalendar/{}", id, calendar.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["calendars"], json!([]));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/meetings/{}/addParticipant/bogus", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid participant ID: bogus");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/meetings/{}/addCalendar/{}", generate_id(), calendar.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Meeting not found");
}

#[tokio::test]
async fn test_update_never_touches_relations_or_id() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let participant = generate_id();
    let mut body = sync_meeting();
    body["participants"] = json!([participant]);
    let id = create(&app, body).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/meetings/{}", id),
        Some(json!({
            "id": generate_id(),
            "location": "room 2",
            "datetime": "2024-03-08 02:30 PM",
            "participants": [],
            "calendars": [generate_id()]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let meeting = &body["data"];
    assert_eq!(meeting["id"], id.as_str());
    assert_eq!(meeting["title"], "Sync");
    assert_eq!(meeting["location"], "room 2");
    assert_eq!(meeting["datetime"], "2024-03-08 02:30 PM");
    assert_eq!(strings(&meeting["participants"]), vec![participant]);
    assert_eq!(meeting["calendars"], json!([]));
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let id = create(&app, sync_meeting()).await;
    let uri = format!("/meetings/{}", id);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Meeting deleted successfully");

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Meeting not found");
}

#[tokio::test]
async fn test_create_validates_relationship_ids() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let mut body = sync_meeting();
    body["attachments"] = json!(["attachment-one"]);

    let (status, body) = send(&app, "POST", "/meetings", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid attachment ID: attachment-one");

    let (_, body) = send(&app, "GET", "/meetings", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_attachments_registry_callbacks_add_then_delete() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let id = create(&app, sync_meeting()).await;
    let by_ids = format!("/meetings?ids={}", id);
    let attachment = generate_id();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/meetings/{}/attachments", id),
        Some(json!({"attachmentsId": attachment})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/meetings/{}/attachments/{}", id, attachment),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attachments"], json!([]));

    let (_, body) = send(&app, "GET", &by_ids, None).await;
    assert_eq!(body["data"][0]["attachments"], json!([]));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/meetings/{}/participants/{}", generate_id(), generate_id()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Meeting not found");
}

#[tokio::test]
async fn test_resource_style_delete_for_calendars_and_participants() {
    let app = meeting_app(Arc::new(StubPeers::default()));
    let calendar = generate_id();
    let participant = generate_id();
    let mut body = sync_meeting();
    body["calendars"] = json!([calendar]);
    body["participants"] = json!([participant]);
    let id = create(&app, body).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/meetings/{}/calendars/{}", id, calendar),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/meetings/{}/participants/{}", id, participant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/meetings?ids={}", id), None).await;
    assert_eq!(body["data"][0]["calendars"], json!([]));
    assert_eq!(body["data"][0]["participants"], json!([]));
}

#[tokio::test]
async fn test_malformed_query_uses_error_envelope() {
    let app = meeting_app(Arc::new(StubPeers::default()));

    let (status, body) = send(&app, "GET", "/meetings?ids=a&ids=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query parameters");
}

#[tokio::test]
async fn test_unknown_route_and_method_use_error_envelope() {
    let app = meeting_app(Arc::new(StubPeers::default()));

    let (status, body) = send(&app, "GET", "/agendas", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");

    let (status, body) = send(&app, "PATCH", "/meetings", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_create_accepts_null_fields() {
    let app = meeting_app(Arc::new(StubPeers::default()));

    let (status, body) = send(
        &app,
        "POST",
        "/meetings",
        Some(json!({
            "title": "Sync",
            "details": null,
            "datetime": null,
            "location": null,
            "calendars": null,
            "participants": null,
            "attachments": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Sync");
    assert_eq!(body["data"]["datetime"], "");
    assert_eq!(body["data"]["participants"], json!([]));
}
