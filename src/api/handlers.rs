use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::logic::Expander;
use crate::model::{first_invalid_id, Id};
use crate::peer::PeerResolver;

/// Shared per-process dependencies, handed to every handler.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub expander: Expander,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, peers: Arc<dyn PeerResolver>) -> Self {
        Self {
            store,
            expander: Expander::new(peers),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            expander: self.expander.clone(),
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Give axum's bare 405 the same `{"error": ...}` body as every other
/// failure, keeping its `Allow` header.
pub async fn envelope_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
        .into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}

/// Every successful payload is wrapped as `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn respond<T: Serialize>(status: StatusCode, data: T) -> ApiResult<Response> {
    let body = serde_json::to_value(DataResponse { data })?;
    Ok((status, Json(body)).into_response())
}

pub fn respond_message(message: &str) -> ApiResult<Response> {
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response())
}

/// Unwrap a JSON body, turning any decode failure into a 400.
pub fn decode_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            log::debug!("Rejected request body: {}", rejection);
            Err(ApiError::bad_request("Invalid request payload"))
        }
    }
}

/// Unwrap query parameters, turning any decode failure into a 400.
pub fn decode_query<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            log::debug!("Rejected query string: {}", rejection);
            Err(ApiError::bad_request("Invalid query parameters"))
        }
    }
}

pub fn require_path_id(id: &str) -> ApiResult<()> {
    if id.trim().is_empty() {
        return Err(ApiError::bad_request("Missing 'id' parameter"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    pub ids: Option<String>,
}

/// Split `a,b,c` into ids. Segments are not trimmed; empty ones are dropped.
pub fn split_ids(raw: &str) -> ApiResult<Vec<Id>> {
    if raw.is_empty() {
        return Err(ApiError::bad_request("Missing 'ids' query parameter"));
    }
    let ids: Vec<Id> = raw
        .split(',')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(ApiError::bad_request("No IDs provided"));
    }
    Ok(ids)
}

/// Body of a relationship mutation. Accepted shapes:
/// `["id", ...]`, `{"participants": ["id", ...]}` or `{"attachmentsId": "id"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RelationshipBody {
    Ids(Vec<Id>),
    Keyed(serde_json::Map<String, Value>),
}

impl RelationshipBody {
    pub fn into_ids(self, field: &str) -> ApiResult<Vec<Id>> {
        let mut object = match self {
            RelationshipBody::Ids(ids) => return Ok(ids),
            RelationshipBody::Keyed(object) => object,
        };

        if let Some(value) = object.remove(field) {
            return match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(id) => Ok(id),
                        _ => Err(ApiError::bad_request("Invalid request payload")),
                    })
                    .collect(),
                Value::Null => Ok(Vec::new()),
                _ => Err(ApiError::bad_request("Invalid request payload")),
            };
        }

        match object.remove(&format!("{}Id", field)) {
            Some(Value::String(id)) => Ok(vec![id]),
            Some(_) => Err(ApiError::bad_request("Invalid request payload")),
            None => Ok(Vec::new()),
        }
    }
}

/// Pull the ids for `field` out of a relationship body. The whole request
/// is refused if the list is empty or any entry is not a well-formed id.
pub fn relationship_ids(
    payload: Result<Json<RelationshipBody>, JsonRejection>,
    field: &str,
    singular: &str,
) -> ApiResult<Vec<Id>> {
    let ids = decode_body(payload)?.into_ids(field)?;
    if ids.is_empty() {
        return Err(ApiError::bad_request(format!("No {} provided", field)));
    }
    validate_relationship_ids(&ids, singular)?;
    Ok(ids)
}

pub fn validate_relationship_ids(ids: &[Id], singular: &str) -> ApiResult<()> {
    match first_invalid_id(ids) {
        Some(invalid) => Err(ApiError::bad_request(format!(
            "Invalid {} ID: {}",
            singular, invalid
        ))),
        None => Ok(()),
    }
}
