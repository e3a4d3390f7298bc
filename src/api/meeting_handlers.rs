use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Json, Response},
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::handlers::{
    decode_body, decode_query, relationship_ids, require_path_id, respond, respond_message,
    split_ids, validate_relationship_ids, AppState, IdsQuery, RelationshipBody,
};
use crate::model::{Id, MeetingRelation, MeetingSummary, MeetingUpdate};
use crate::store::traits::Store;

/// GET /meetings and GET /meetings?ids=a,b
///
/// The `ids` form answers sibling lookups and returns stored summaries.
pub async fn list_meetings<S: Store>(
    State(state): State<AppState<S>>,
    query: Result<Query<IdsQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let query = decode_query(query)?;
    if let Some(raw) = query.ids {
        let ids = split_ids(&raw)?;
        let meetings = state
            .store
            .list_meetings_by_ids(&ids)
            .await
            .map_err(|e| ApiError::storage("Error fetching meetings", e))?;
        return respond(StatusCode::OK, meetings);
    }

    let summaries = state
        .store
        .list_meetings()
        .await
        .map_err(|e| ApiError::storage("Error fetching meetings", e))?;
    let meetings = state.expander.expand_meetings(summaries).await;
    respond(StatusCode::OK, meetings)
}

/// GET /meetings/{id}
pub async fn get_meeting<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let summary = state
        .store
        .get_meeting(&id)
        .await
        .map_err(|e| ApiError::storage("Error fetching meeting", e))?
        .ok_or_else(|| ApiError::not_found("Meeting not found"))?;

    respond(StatusCode::OK, state.expander.expand_meeting(summary).await)
}

/// POST /meetings
///
/// The datetime text is stored as given; it is only interpreted when the
/// meeting is expanded.
pub async fn create_meeting<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<MeetingSummary>, JsonRejection>,
) -> ApiResult<Response> {
    let meeting = decode_body(payload)?;
    for relation in MeetingRelation::ALL {
        validate_relationship_ids(meeting.relation(relation), relation.singular())?;
    }

    let created = state
        .store
        .insert_meeting(meeting)
        .await
        .map_err(|e| ApiError::storage("Error inserting meeting", e))?;

    log::info!("Created meeting {}", created.id);
    respond(StatusCode::CREATED, created)
}

/// PUT /meetings/{id}
pub async fn update_meeting<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    payload: Result<Json<MeetingUpdate>, JsonRejection>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let update = decode_body(payload)?;

    let updated = state
        .store
        .update_meeting(&id, &update)
        .await
        .map_err(|e| ApiError::storage("Error updating meeting", e))?
        .ok_or_else(|| ApiError::not_found("Meeting not found"))?;

    respond(StatusCode::OK, updated)
}

/// DELETE /meetings/{id}
pub async fn delete_meeting<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let deleted = state
        .store
        .delete_meeting(&id)
        .await
        .map_err(|e| ApiError::storage("Error deleting meeting", e))?;

    if !deleted {
        return Err(ApiError::not_found("Meeting not found"));
    }

    log::info!("Deleted meeting {}", id);
    respond_message("Meeting deleted successfully")
}

// Batch relationship endpoints: POST /meetings/{id}/add<Relation>s etc.

pub async fn add_calendars<S: Store>(
    state: State<AppState<S>>,
    id: Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    add_batch(state, id, payload, MeetingRelation::Calendars).await
}

pub async fn remove_calendars<S: Store>(
    state: State<AppState<S>>,
    id: Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    remove_batch(state, id, payload, MeetingRelation::Calendars).await
}

pub async fn add_participants<S: Store>(
    state: State<AppState<S>>,
    id: Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    add_batch(state, id, payload, MeetingRelation::Participants).await
}

pub async fn remove_participants<S: Store>(
    state: State<AppState<S>>,
    id: Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    remove_batch(state, id, payload, MeetingRelation::Participants).await
}

pub async fn add_attachments<S: Store>(
    state: State<AppState<S>>,
    id: Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    add_batch(state, id, payload, MeetingRelation::Attachments).await
}

pub async fn remove_attachments<S: Store>(
    state: State<AppState<S>>,
    id: Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    remove_batch(state, id, payload, MeetingRelation::Attachments).await
}

// Single-id endpoints: GET /meetings/{id}/add<Relation>/{related_id} etc.

pub async fn add_calendar<S: Store>(
    state: State<AppState<S>>,
    ids: Path<(Id, Id)>,
) -> ApiResult<Response> {
    add_single(state, ids, MeetingRelation::Calendars).await
}

pub async fn remove_calendar<S: Store>(
    state: State<AppState<S>>,
    ids: Path<(Id, Id)>,
) -> ApiResult<Response> {
    remove_single(state, ids, MeetingRelation::Calendars).await
}

pub async fn add_participant<S: Store>(
    state: State<AppState<S>>,
    ids: Path<(Id, Id)>,
) -> ApiResult<Response> {
    add_single(state, ids, MeetingRelation::Participants).await
}

pub async fn remove_participant<S: Store>(
    state: State<AppState<S>>,
    ids: Path<(Id, Id)>,
) -> ApiResult<Response> {
    remove_single(state, ids, MeetingRelation::Participants).await
}

pub async fn add_attachment<S: Store>(
    state: State<AppState<S>>,
    ids: Path<(Id, Id)>,
) -> ApiResult<Response> {
    add_single(state, ids, MeetingRelation::Attachments).await
}

pub async fn remove_attachment<S: Store>(
    state: State<AppState<S>>,
    ids: Path<(Id, Id)>,
) -> ApiResult<Response> {
    remove_single(state, ids, MeetingRelation::Attachments).await
}

async fn add_batch<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
    relation: MeetingRelation,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let values = relationship_ids(payload, relation.field(), relation.singular())?;
    add_to_meeting(&state, &id, relation, &values).await
}

async fn remove_batch<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
    relation: MeetingRelation,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let values = relationship_ids(payload, relation.field(), relation.singular())?;
    remove_from_meeting(&state, &id, relation, &values).await
}

async fn add_single<S: Store>(
    State(state): State<AppState<S>>,
    Path((id, related_id)): Path<(Id, Id)>,
    relation: MeetingRelation,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let values = vec![related_id];
    validate_relationship_ids(&values, relation.singular())?;
    add_to_meeting(&state, &id, relation, &values).await
}

async fn remove_single<S: Store>(
    State(state): State<AppState<S>>,
    Path((id, related_id)): Path<(Id, Id)>,
    relation: MeetingRelation,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let values = vec![related_id];
    validate_relationship_ids(&values, relation.singular())?;
    remove_from_meeting(&state, &id, relation, &values).await
}

async fn add_to_meeting<S: Store>(
    state: &AppState<S>,
    id: &Id,
    relation: MeetingRelation,
    values: &[Id],
) -> ApiResult<Response> {
    let updated = state
        .store
        .add_to_meeting(id, relation, values)
        .await
        .map_err(|e| ApiError::storage("Error updating meeting", e))?
        .ok_or_else(|| ApiError::not_found("Meeting not found"))?;

    respond(StatusCode::OK, state.expander.expand_meeting(updated).await)
}

async fn remove_from_meeting<S: Store>(
    state: &AppState<S>,
    id: &Id,
    relation: MeetingRelation,
    values: &[Id],
) -> ApiResult<Response> {
    let updated = state
        .store
        .remove_from_meeting(id, relation, values)
        .await
        .map_err(|e| ApiError::storage("Error updating meeting", e))?
        .ok_or_else(|| ApiError::not_found("Meeting not found"))?;

    respond(StatusCode::OK, state.expander.expand_meeting(updated).await)
}
