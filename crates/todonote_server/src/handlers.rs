//! HTTP request handlers for the notes API.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use todonote_core::{core_version, ping, Note, NoteId, NoteQuery};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ping: &'static str,
    pub version: &'static str,
}

/// Acknowledgement for endpoints that do not return a note.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// `GET /api/notes` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub deleted: Option<String>,
}

/// `POST /api/notes` body.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// `PUT /api/notes/{id}` body. Absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// `POST /api/notes/{id}/complete` body. A missing body or field means `false`.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub completed: bool,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ping: ping(),
        version: core_version(),
    })
}

/// GET /api/notes?status=active|completed&deleted=true|false
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Note>>> {
    let query = NoteQuery::parse(params.status.as_deref(), params.deleted.as_deref())?;
    let notes = state.with_notes(move |notes| notes.query(&query)).await?;
    Ok(Json(notes))
}

/// GET /api/notes/{id}
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Note>> {
    let id = parse_note_id(&id)?;
    let note = state.with_notes(move |notes| notes.get(&id)).await?;
    Ok(Json(note))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>)> {
    let Json(request) = payload.map_err(bad_json)?;
    let note = state
        .with_notes(move |notes| notes.create(&request.title, request.body.unwrap_or_default()))
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /api/notes/{id}
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>> {
    let id = parse_note_id(&id)?;
    let Json(request) = payload.map_err(bad_json)?;
    let note = state
        .with_notes(move |notes| {
            notes.update(&id, request.title.as_deref(), request.body.as_deref())
        })
        .await?;
    Ok(Json(note))
}

/// POST /api/notes/{id}/complete
pub async fn set_completed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Note>> {
    let id = parse_note_id(&id)?;
    let request: CompleteRequest = optional_json(&body)?;
    let note = state
        .with_notes(move |notes| notes.set_completed(&id, request.completed))
        .await?;
    Ok(Json(note))
}

/// DELETE /api/notes/{id}
///
/// Soft delete; the note moves to the deleted view.
pub async fn soft_delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>> {
    let id = parse_note_id(&id)?;
    state.with_notes(move |notes| notes.soft_delete(&id)).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// POST /api/notes/{id}/restore
pub async fn restore_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Note>> {
    let id = parse_note_id(&id)?;
    let note = state.with_notes(move |notes| notes.restore(&id)).await?;
    Ok(Json(note))
}

/// DELETE /api/notes/{id}/permanent
pub async fn purge_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>> {
    let id = parse_note_id(&id)?;
    state.with_notes(move |notes| notes.purge(&id)).await?;
    Ok(Json(OkResponse { ok: true }))
}

// A blank id cannot name a stored note.
fn parse_note_id(raw: &str) -> Result<NoteId> {
    NoteId::parse(raw).map_err(|_| ServerError::NotFound)
}

// Blank bodies read as the default request; anything else must be JSON.
fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        ServerError::BadRequest(format!("Failed to parse the request body as JSON: {err}"))
    })
}

fn bad_json(rejection: JsonRejection) -> ServerError {
    ServerError::BadRequest(rejection.body_text())
}
