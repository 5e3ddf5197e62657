//! Notes JSON API.
//!
//! ```text
//! GET    /api/notes       - List notes
//! POST   /api/notes       - Create note (201)
//! GET    /api/notes/{id}  - Get note
//! PUT    /api/notes/{id}  - Replace note
//! DELETE /api/notes/{id}  - Delete note (204, also for unknown IDs)
//! ```
//!
//! An `{id}` that is not a number names no note: 404 for `GET` and `PUT`,
//! 204 for `DELETE`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use market_core::NoteId;

use crate::models::Note;
use crate::services::NoteInput;
use crate::state::AppState;

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found() -> Response {
    message(StatusCode::NOT_FOUND, "Note not found")
}

/// List every note in creation order.
pub async fn list(State(state): State<AppState>) -> Json<Vec<Note>> {
    Json(state.notes().list().await)
}

/// Create a note from a JSON body.
pub async fn create(State(state): State<AppState>, Json(input): Json<NoteInput>) -> Response {
    match state.notes().create(input).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(err) => message(StatusCode::SERVICE_UNAVAILABLE, &err.to_string()),
    }
}

/// Fetch one note.
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<NoteId>() else {
        return not_found();
    };
    match state.notes().get(id).await {
        Some(note) => Json(note).into_response(),
        None => not_found(),
    }
}

/// Replace a note's title and content.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<NoteInput>,
) -> Response {
    let Ok(id) = id.parse::<NoteId>() else {
        return not_found();
    };
    match state.notes().update(id, input).await {
        Some(note) => Json(note).into_response(),
        None => not_found(),
    }
}

/// Delete a note.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let deleted = match id.parse::<NoteId>() {
        Ok(note_id) => state.notes().delete(note_id).await,
        Err(_) => false,
    };
    if !deleted {
        tracing::debug!(note_id = %id, "Delete of unknown note");
    }
    StatusCode::NO_CONTENT
}
