//! Application state for the todonote server.

use std::sync::{Arc, Mutex};

use todonote_core::{JsonFileNoteRepository, NoteRepository, NoteService, NoteServiceResult};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Note store type shared by every request.
pub type SharedNoteService = NoteService<Box<dyn NoteRepository + Send>>;

/// State shared by all request handlers.
pub struct AppState {
    pub config: ServerConfig,
    // One lock for the whole store: each request's load-mutate-save cycle
    // runs to completion before the next one starts.
    notes: Mutex<SharedNoteService>,
}

impl AppState {
    /// Creates state backed by the configured JSON data file.
    pub fn new(config: ServerConfig) -> Self {
        let repo = JsonFileNoteRepository::new(config.data_file.clone());
        Self::with_repository(config, Box::new(repo))
    }

    /// Creates state over any repository implementation.
    pub fn with_repository(config: ServerConfig, repo: Box<dyn NoteRepository + Send>) -> Self {
        Self {
            config,
            notes: Mutex::new(NoteService::new(repo)),
        }
    }

    /// Runs one note store operation on the blocking thread pool.
    pub async fn with_notes<T, F>(self: &Arc<Self>, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SharedNoteService) -> NoteServiceResult<T> + Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let notes = state
                .notes
                .lock()
                .map_err(|_| ServerError::Internal("note store lock poisoned".to_string()))?;
            operation(&notes).map_err(ServerError::from)
        })
        .await
        .map_err(|err| ServerError::Internal(format!("note store task failed: {err}")))?
    }
}
