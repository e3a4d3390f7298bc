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
use crate::model::{CalendarRelation, CalendarSummary, CalendarUpdate, Id};
use crate::store::traits::Store;

/// GET /calendars and GET /calendars?ids=a,b
///
/// Without `ids` every calendar is returned with its meetings resolved;
/// with `ids` the matching summaries are returned as stored.
pub async fn list_calendars<S: Store>(
    State(state): State<AppState<S>>,
    query: Result<Query<IdsQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let query = decode_query(query)?;
    if let Some(raw) = query.ids {
        let ids = split_ids(&raw)?;
        let calendars = state
            .store
            .list_calendars_by_ids(&ids)
            .await
            .map_err(|e| ApiError::storage("Error fetching calendars", e))?;
        return respond(StatusCode::OK, calendars);
    }

    let summaries = state
        .store
        .list_calendars()
        .await
        .map_err(|e| ApiError::storage("Error fetching calendars", e))?;
    let calendars = state.expander.expand_calendars(summaries).await;
    respond(StatusCode::OK, calendars)
}

/// GET /calendars/{id}
pub async fn get_calendar<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let summary = state
        .store
        .get_calendar(&id)
        .await
        .map_err(|e| ApiError::storage("Error fetching calendar", e))?
        .ok_or_else(|| ApiError::not_found("Calendar not found"))?;

    respond(StatusCode::OK, state.expander.expand_calendar(summary).await)
}

/// POST /calendars
pub async fn create_calendar<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CalendarSummary>, JsonRejection>,
) -> ApiResult<Response> {
    let calendar = decode_body(payload)?;
    validate_relationship_ids(&calendar.meetings, "meeting")?;

    let created = state
        .store
        .insert_calendar(calendar)
        .await
        .map_err(|e| ApiError::storage("Error inserting calendar", e))?;

    log::info!("Created calendar {}", created.id);
    respond(StatusCode::CREATED, created)
}

/// PUT /calendars/{id}
///
/// Only title and details are replaced; id and meetings in the body are
/// ignored.
pub async fn update_calendar<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    payload: Result<Json<CalendarUpdate>, JsonRejection>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let update = decode_body(payload)?;

    let updated = state
        .store
        .update_calendar(&id, &update)
        .await
        .map_err(|e| ApiError::storage("Error updating calendar", e))?
        .ok_or_else(|| ApiError::not_found("Calendar not found"))?;

    respond(StatusCode::OK, updated)
}

/// DELETE /calendars/{id}
///
/// Meetings that reference the calendar are left as they are.
pub async fn delete_calendar<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let deleted = state
        .store
        .delete_calendar(&id)
        .await
        .map_err(|e| ApiError::storage("Error deleting calendar", e))?;

    if !deleted {
        return Err(ApiError::not_found("Calendar not found"));
    }

    log::info!("Deleted calendar {}", id);
    respond_message("Calendar deleted successfully")
}

/// POST /calendars/{id}/meetings, POST /calendars/{id}/addMeetings
pub async fn add_meetings<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let meetings = relationship_ids(payload, "meetings", "meeting")?;
    add_to_calendar(&state, &id, &meetings).await
}

/// POST /calendars/{id}/removeMeetings, DELETE /calendars/{id}/meetings
pub async fn remove_meetings<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    payload: Result<Json<RelationshipBody>, JsonRejection>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let meetings = relationship_ids(payload, "meetings", "meeting")?;
    remove_from_calendar(&state, &id, &meetings).await
}

/// GET /calendars/{id}/addMeeting/{meeting_id}
pub async fn add_meeting<S: Store>(
    State(state): State<AppState<S>>,
    Path((id, meeting_id)): Path<(Id, Id)>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let meetings = vec![meeting_id];
    validate_relationship_ids(&meetings, "meeting")?;
    add_to_calendar(&state, &id, &meetings).await
}

/// GET /calendars/{id}/removeMeeting/{meeting_id}
pub async fn remove_meeting<S: Store>(
    State(state): State<AppState<S>>,
    Path((id, meeting_id)): Path<(Id, Id)>,
) -> ApiResult<Response> {
    require_path_id(&id)?;
    let meetings = vec![meeting_id];
    validate_relationship_ids(&meetings, "meeting")?;
    remove_from_calendar(&state, &id, &meetings).await
}

async fn add_to_calendar<S: Store>(
    state: &AppState<S>,
    id: &Id,
    meetings: &[Id],
) -> ApiResult<Response> {
    let updated = state
        .store
        .add_to_calendar(id, CalendarRelation::Meetings, meetings)
        .await
        .map_err(|e| ApiError::storage("Error updating calendar", e))?
        .ok_or_else(|| ApiError::not_found("Calendar not found"))?;

    respond(StatusCode::OK, state.expander.expand_calendar(updated).await)
}

async fn remove_from_calendar<S: Store>(
    state: &AppState<S>,
    id: &Id,
    meetings: &[Id],
) -> ApiResult<Response> {
    let updated = state
        .store
        .remove_from_calendar(id, CalendarRelation::Meetings, meetings)
        .await
        .map_err(|e| ApiError::storage("Error updating calendar", e))?
        .ok_or_else(|| ApiError::not_found("Calendar not found"))?;

    respond(StatusCode::OK, state.expander.expand_calendar(updated).await)
}
