//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Storage;
use crate::services::NoteBook;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Storage,
    notes: NoteBook,
}

impl AppState {
    /// Create a new application state with an empty note book.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Storage) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                notes: NoteBook::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the storage collaborators.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Get a reference to the notes collection.
    #[must_use]
    pub fn notes(&self) -> &NoteBook {
        &self.inner.notes
    }
}
