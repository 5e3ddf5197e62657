//! In-memory notes collection behind the `/api/notes` endpoints.
//!
//! Notes are not persisted. IDs are handed out from a counter that only
//! moves forward, so a deleted note's ID is never given to a new note.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use market_core::NoteId;

use crate::models::Note;

/// Request body for creating or replacing a note.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Every ID up to `i32::MAX` has been handed out.
#[derive(Debug, Error)]
#[error("no note IDs left")]
pub struct NoteIdsExhausted;

#[derive(Default)]
struct Notes {
    entries: BTreeMap<NoteId, Note>,
    last_id: i32,
}

/// Lock-guarded note collection, owned by the application state.
#[derive(Default)]
pub struct NoteBook {
    inner: RwLock<Notes>,
}

impl NoteBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notes in creation order.
    pub async fn list(&self) -> Vec<Note> {
        self.inner.read().await.entries.values().cloned().collect()
    }

    /// Add a note under the next ID.
    ///
    /// # Errors
    ///
    /// Returns [`NoteIdsExhausted`] once the counter has reached `i32::MAX`.
    /// The collection is left unchanged.
    pub async fn create(&self, input: NoteInput) -> Result<Note, NoteIdsExhausted> {
        let mut notes = self.inner.write().await;
        let Some(id) = notes.last_id.checked_add(1) else {
            warn!(last_id = notes.last_id, "Note ID counter exhausted");
            return Err(NoteIdsExhausted);
        };
        notes.last_id = id;
        let note = Note {
            id: NoteId::new(id),
            title: input.title,
            content: input.content,
        };
        notes.entries.insert(note.id, note.clone());
        debug!(note_id = %note.id, "Note created");
        Ok(note)
    }

    pub async fn get(&self, id: NoteId) -> Option<Note> {
        self.inner.read().await.entries.get(&id).cloned()
    }

    /// Replace a note's title and content. `None` if it does not exist.
    pub async fn update(&self, id: NoteId, input: NoteInput) -> Option<Note> {
        let mut notes = self.inner.write().await;
        let note = notes.entries.get_mut(&id)?;
        note.title = input.title;
        note.content = input.content;
        Some(note.clone())
    }

    /// Remove a note. Returns whether it existed.
    pub async fn delete(&self, id: NoteId) -> bool {
        self.inner.write().await.entries.remove(&id).is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str) -> NoteInput {
        NoteInput {
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_list_get() {
        let book = NoteBook::new();
        let first = book.create(input("groceries", "milk")).await.unwrap();
        let second = book.create(input("todo", "ship it")).await.unwrap();

        assert_eq!(first.id, NoteId::new(1));
        assert_eq!(second.id, NoteId::new(2));
        assert_eq!(book.list().await, vec![first.clone(), second]);
        assert_eq!(book.get(first.id).await, Some(first));
        assert_eq!(book.get(NoteId::new(99)).await, None);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let book = NoteBook::new();
        let note = book.create(input("draft", "")).await.unwrap();

        let updated = book.update(note.id, input("final", "done")).await.unwrap();
        assert_eq!(updated.title, "final");
        assert_eq!(updated.content, "done");
        assert!(book.update(NoteId::new(42), input("x", "y")).await.is_none());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let book = NoteBook::new();
        let first = book.create(input("a", "")).await.unwrap();
        let second = book.create(input("b", "")).await.unwrap();

        assert!(book.delete(second.id).await);
        assert!(!book.delete(second.id).await);

        let third = book.create(input("c", "")).await.unwrap();
        assert_eq!(third.id, NoteId::new(3));
        assert_eq!(book.list().await.len(), 2);
        assert!(book.get(first.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_refuses_once_ids_run_out() {
        let book = NoteBook::new();
        book.inner.write().await.last_id = i32::MAX - 1;

        let last = book.create(input("last", "")).await.unwrap();
        assert_eq!(last.id, NoteId::new(i32::MAX));

        assert!(book.create(input("overflow", "")).await.is_err());
        assert!(book.create(input("again", "")).await.is_err());

        let notes = book.list().await;
        assert_eq!(notes, vec![last.clone()]);
        assert_eq!(book.get(last.id).await.unwrap().title, "last");
    }
}
