//! Core domain logic for todonote.
//! This crate is the single source of truth for note lifecycle invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::note::{
    HistoryAction, HistoryEntry, Note, NoteContent, NoteId, NoteIdError, NoteState,
    NoteValidationError,
};
pub use repo::note_repo::{
    InMemoryNoteRepository, JsonFileNoteRepository, NoteDocument, NoteRepository, RepoError,
    RepoResult,
};
pub use service::note_service::{Clock, NoteService, NoteServiceError, NoteServiceResult};
pub use view::filter::{NoteQuery, NoteView, StatusFilter, ViewParseError};

/// Minimal health-check API for front-end probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
