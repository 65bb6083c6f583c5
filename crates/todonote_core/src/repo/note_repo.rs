//! Note repository contracts with JSON file and in-memory implementations.
//!
//! # Responsibility
//! - Load and save the whole note document `{ "notes": [...] }`.
//! - Validate documents on the way in and out.
//!
//! # Invariants
//! - A missing data file reads as an empty document.
//! - A malformed data file is reported, never overwritten on read.
//! - Note ids are unique within one document.

use crate::model::note::{Note, NoteId, NoteValidationError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum RepoError {
    /// File system failure while reading or writing the document.
    Io { path: PathBuf, source: io::Error },
    /// Document could not be encoded or decoded as JSON.
    Serialization(serde_json::Error),
    /// Document decoded but violates a note invariant.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error on `{}`: {source}", path.display()),
            Self::Serialization(err) => write!(f, "note document serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Whole persisted state. Notes are kept newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDocument {
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl NoteDocument {
    /// Checks per-note invariants and id uniqueness.
    pub fn validate(&self) -> RepoResult<()> {
        let mut seen = HashSet::with_capacity(self.notes.len());
        for note in &self.notes {
            if !seen.insert(&note.id) {
                return Err(RepoError::InvalidData(format!("duplicate note id {}", note.id)));
            }
            note.validate().map_err(|err| match err {
                NoteValidationError::EmptyTitle => {
                    RepoError::InvalidData(format!("note {} has an empty title", note.id))
                }
            })?;
        }
        Ok(())
    }

    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == *id)
    }
}

/// Repository interface for the note document.
pub trait NoteRepository {
    /// Loads the full document.
    fn load(&self) -> RepoResult<NoteDocument>;
    /// Replaces the full document.
    fn save(&self, document: &NoteDocument) -> RepoResult<()>;
}

impl<R: NoteRepository + ?Sized> NoteRepository for &R {
    fn load(&self) -> RepoResult<NoteDocument> {
        (**self).load()
    }

    fn save(&self, document: &NoteDocument) -> RepoResult<()> {
        (**self).save(document)
    }
}

impl<R: NoteRepository + ?Sized> NoteRepository for Box<R> {
    fn load(&self) -> RepoResult<NoteDocument> {
        (**self).load()
    }

    fn save(&self, document: &NoteDocument) -> RepoResult<()> {
        (**self).save(document)
    }
}

/// Flat JSON file repository.
///
/// Single writer: concurrent processes saving the same file race and the
/// last write wins.
#[derive(Debug, Clone)]
pub struct JsonFileNoteRepository {
    path: PathBuf,
}

impl JsonFileNoteRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoteRepository for JsonFileNoteRepository {
    fn load(&self) -> RepoResult<NoteDocument> {
        let started_at = Instant::now();
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("event=store_load module=repo status=ok mode=file notes=0 missing=true");
                return Ok(NoteDocument::default());
            }
            Err(err) => {
                error!(
                    "event=store_load module=repo status=error mode=file error_code=read_failed error={}",
                    err
                );
                return Err(RepoError::Io {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        let document: NoteDocument = serde_json::from_str(&text).map_err(|err| {
            error!(
                "event=store_load module=repo status=error mode=file error_code=decode_failed error={}",
                err
            );
            RepoError::from(err)
        })?;
        document.validate()?;

        info!(
            "event=store_load module=repo status=ok mode=file notes={} duration_ms={}",
            document.notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(document)
    }

    fn save(&self, document: &NoteDocument) -> RepoResult<()> {
        document.validate()?;
        let started_at = Instant::now();
        let text = serde_json::to_string_pretty(document)?;

        let io_err = |source: io::Error| RepoError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&self.path, text).map_err(|err| {
            error!(
                "event=store_save module=repo status=error mode=file error_code=write_failed error={}",
                err
            );
            io_err(err)
        })?;

        info!(
            "event=store_save module=repo status=ok mode=file notes={} duration_ms={}",
            document.notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Process-local repository, used by tests and embedders.
#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    document: Mutex<NoteDocument>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> RepoError {
        RepoError::InvalidData("in-memory note document lock poisoned".to_string())
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn load(&self) -> RepoResult<NoteDocument> {
        let guard = self.document.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.clone())
    }

    fn save(&self, document: &NoteDocument) -> RepoResult<()> {
        document.validate()?;
        let mut guard = self.document.lock().map_err(|_| Self::poisoned())?;
        *guard = document.clone();
        Ok(())
    }
}
