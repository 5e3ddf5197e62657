//! Note type for the notes API.

use serde::Serialize;

use market_core::NoteId;

/// A free-form note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
}
