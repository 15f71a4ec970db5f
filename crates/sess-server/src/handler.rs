use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sess_query::QueryError;
use sess_repo::{InvalidPayload, Scope, Session, SessionError, SessionResult, SessionType};

use crate::error::ApiError;
use crate::router::AppState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct FieldQuery {
    pub field: Option<String>,
    pub value: Option<String>,
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    let types: Vec<&str> = SessionType::ALL.iter().map(|t| t.as_str()).collect();
    Json(json!({
        "name": "sess-server",
        "version": env!("CARGO_PKG_VERSION"),
        "session_types": types,
    }))
}

pub async fn list_handler(
    State(state): State<AppState>,
    Path((source, kind)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Session>>> {
    let scope = Scope::parse(&source, &kind)?;
    let repo = state.repo;
    let sessions = blocking(move || repo.list_all(&scope)).await?;
    Ok(Json(sessions))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Path((source, kind)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let scope = Scope::parse(&source, &kind)?;
    let repo = state.repo;
    let session = blocking(move || {
        let text = body_text(&body)?;
        repo.create(&scope, text)
    })
    .await?;
    Ok(Json(json!({ "id": session.id })))
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path((source, kind, id)): Path<(String, String, String)>,
) -> ApiResult<Json<Session>> {
    let scope = Scope::parse(&source, &kind)?;
    let repo = state.repo;
    let session = blocking(move || repo.get_by_id(&scope, &id)).await?;
    Ok(Json(session))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path((source, kind, id)): Path<(String, String, String)>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let scope = Scope::parse(&source, &kind)?;
    let repo = state.repo;
    blocking(move || {
        let text = body_text(&body)?;
        repo.replace(&scope, &id, text)
    })
    .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path((source, kind, id)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let scope = Scope::parse(&source, &kind)?;
    let repo = state.repo;
    blocking(move || repo.delete(&scope, &id)).await?;
    Ok(StatusCode::OK)
}

/// `GET .../query?field=<path>&value=<string>`
pub async fn query_handler(
    State(state): State<AppState>,
    Path((source, kind)): Path<(String, String)>,
    Query(query): Query<FieldQuery>,
) -> ApiResult<Json<Vec<Session>>> {
    let scope = Scope::parse(&source, &kind)?;
    // A missing field is validated as the empty path.
    let field = query.field.unwrap_or_default();
    let value = query.value.ok_or(ApiError::MissingParameter("value"))?;
    let repo = state.repo;
    let sessions = blocking(move || repo.get_by_field(&scope, &field, &value)).await?;
    Ok(Json(sessions))
}

/// `POST .../query/fetch` with a JSON filter document as the body.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path((source, kind)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Vec<Session>>> {
    let scope = Scope::parse(&source, &kind)?;
    let repo = state.repo;
    let sessions = blocking(move || {
        let filter = std::str::from_utf8(&body)
            .map_err(|e| SessionError::from(QueryError::Malformed(e.to_string())))?;
        repo.fetch_by_query(&scope, filter)
    })
    .await?;
    Ok(Json(sessions))
}

/// An empty body is an absent payload, not an empty string.
fn body_text(body: &Bytes) -> SessionResult<Option<&str>> {
    if body.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(body)
        .map(Some)
        .map_err(|e| SessionError::from(InvalidPayload::Malformed(e.to_string())))
}

/// Run a repository call off the async workers; journal appends may block on disk.
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> SessionResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_absent() {
        assert_eq!(body_text(&Bytes::new()).unwrap(), None);
    }

    #[test]
    fn text_body_passes_through() {
        let body = Bytes::from_static(b"  {\"a\":1} ");
        assert_eq!(body_text(&body).unwrap(), Some("  {\"a\":1} "));
    }

    #[test]
    fn non_utf8_body_is_malformed() {
        let body = Bytes::from_static(&[0xff, 0xfe, b'{']);
        assert!(matches!(
            body_text(&body),
            Err(SessionError::Invalid(InvalidPayload::Malformed(_)))
        ));
    }
}
