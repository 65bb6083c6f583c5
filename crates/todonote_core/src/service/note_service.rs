//! Note use-case service.
//!
//! # Responsibility
//! - Provide the note store API: create/get/list/update/complete/delete/
//!   restore/purge.
//! - Enforce the note lifecycle state machine.
//! - Run every mutation as one load -> mutate -> save cycle.
//!
//! # Invariants
//! - New notes are prepended, so document order is newest first.
//! - A mutation that changes nothing does not write the document.
//! - Transitions outside the state machine fail with `InvalidTransition`.

use crate::model::note::{Note, NoteId, NoteState, NoteValidationError};
use crate::repo::note_repo::{NoteDocument, NoteRepository, RepoError};
use crate::view::filter::{apply_query, apply_view, NoteQuery, NoteView};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Time source for timestamps written by the service.
pub type Clock = fn() -> DateTime<Utc>;

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input violates a note invariant.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NotFound(NoteId),
    /// Operation is not allowed from the note's current state.
    InvalidTransition {
        id: NoteId,
        state: NoteState,
        operation: &'static str,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidTransition {
                id,
                state,
                operation,
            } => write!(f, "cannot {operation} note {id} while it is {state}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InvalidTransition { .. } => None,
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Note store facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    clock: Clock,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository and wall-clock time.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Utc::now)
    }

    /// Creates a service with an explicit time source.
    pub fn with_clock(repo: R, clock: Clock) -> Self {
        Self { repo, clock }
    }

    /// Creates one active note and stores it at the top of the list.
    pub fn create(&self, title: &str, body: impl Into<String>) -> NoteServiceResult<Note> {
        let note = Note::new(title, body, (self.clock)()).map_err(|err| {
            warn!("event=note_create module=service status=rejected reason=empty_title");
            NoteServiceError::from(err)
        })?;

        let mut document = self.repo.load()?;
        document.notes.insert(0, note.clone());
        self.repo.save(&document)?;

        info!(
            "event=note_create module=service status=ok note_id={} body_len={}",
            note.id,
            note.body.chars().count()
        );
        Ok(note)
    }

    /// Gets one note by stable ID, deleted notes included.
    pub fn get(&self, id: &NoteId) -> NoteServiceResult<Note> {
        let document = self.repo.load()?;
        document
            .find(id)
            .cloned()
            .ok_or_else(|| NoteServiceError::NotFound(id.clone()))
    }

    /// Lists the notes of one view, newest first.
    pub fn list(&self, view: NoteView) -> NoteServiceResult<Vec<Note>> {
        let document = self.repo.load()?;
        Ok(apply_view(&document.notes, view))
    }

    /// Lists notes matching a `status`/`deleted` query, newest first.
    pub fn query(&self, query: &NoteQuery) -> NoteServiceResult<Vec<Note>> {
        let document = self.repo.load()?;
        Ok(apply_query(&document.notes, query))
    }

    /// Lists one view, falling back to an empty list when storage fails.
    ///
    /// Used by front-ends that prefer an empty screen over an error.
    pub fn list_or_empty(&self, view: NoteView) -> Vec<Note> {
        match self.list(view) {
            Ok(notes) => notes,
            Err(err) => {
                error!(
                    "event=note_list module=service status=error fallback=empty view={} error={}",
                    view, err
                );
                Vec::new()
            }
        }
    }

    /// Applies a partial content edit.
    ///
    /// An edit that leaves title and body unchanged returns the note as-is
    /// without recording history.
    pub fn update(
        &self,
        id: &NoteId,
        title: Option<&str>,
        body: Option<&str>,
    ) -> NoteServiceResult<Note> {
        self.mutate(id, "edit", |note, now| {
            reject_if_deleted(note, "edit")?;
            Ok(note.apply_edit(title, body, now)?)
        })
    }

    /// Moves a note between the active and completed views.
    pub fn set_completed(&self, id: &NoteId, completed: bool) -> NoteServiceResult<Note> {
        let operation = if completed { "complete" } else { "reactivate" };
        self.mutate(id, operation, |note, now| {
            reject_if_deleted(note, operation)?;
            Ok(note.set_completed(completed, now))
        })
    }

    /// Moves an active or completed note to the deleted view.
    pub fn soft_delete(&self, id: &NoteId) -> NoteServiceResult<Note> {
        self.mutate(id, "delete", |note, now| {
            reject_if_deleted(note, "delete")?;
            note.soft_delete(now);
            Ok(true)
        })
    }

    /// Brings a deleted note back to the view it left.
    pub fn restore(&self, id: &NoteId) -> NoteServiceResult<Note> {
        self.mutate(id, "restore", |note, now| {
            require_deleted(note, "restore")?;
            note.restore(now);
            Ok(true)
        })
    }

    /// Removes a deleted note permanently.
    pub fn purge(&self, id: &NoteId) -> NoteServiceResult<()> {
        let mut document = self.repo.load()?;
        let index = position_of(&document, id)?;
        require_deleted(&document.notes[index], "purge")?;

        document.notes.remove(index);
        self.repo.save(&document)?;

        info!("event=note_purge module=service status=ok note_id={id}");
        Ok(())
    }

    fn mutate<F>(&self, id: &NoteId, operation: &'static str, apply: F) -> NoteServiceResult<Note>
    where
        F: FnOnce(&mut Note, DateTime<Utc>) -> NoteServiceResult<bool>,
    {
        let mut document = self.repo.load()?;
        let index = position_of(&document, id)?;
        let note = &mut document.notes[index];

        let changed = match apply(note, (self.clock)()) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(
                    "event=note_{operation} module=service status=rejected note_id={id} error={err}"
                );
                return Err(err);
            }
        };
        let updated = note.clone();

        if changed {
            self.repo.save(&document)?;
        }

        info!(
            "event=note_{operation} module=service status=ok note_id={id} changed={changed} state={}",
            updated.state()
        );
        Ok(updated)
    }
}

fn position_of(document: &NoteDocument, id: &NoteId) -> NoteServiceResult<usize> {
    document
        .notes
        .iter()
        .position(|note| note.id == *id)
        .ok_or_else(|| NoteServiceError::NotFound(id.clone()))
}

fn reject_if_deleted(note: &Note, operation: &'static str) -> NoteServiceResult<()> {
    if note.deleted {
        return Err(NoteServiceError::InvalidTransition {
            id: note.id.clone(),
            state: note.state(),
            operation,
        });
    }
    Ok(())
}

fn require_deleted(note: &Note, operation: &'static str) -> NoteServiceResult<()> {
    if !note.deleted {
        return Err(NoteServiceError::InvalidTransition {
            id: note.id.clone(),
            state: note.state(),
            operation,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NoteService, NoteServiceError};
    use crate::model::note::NoteState;
    use crate::repo::note_repo::InMemoryNoteRepository;
    use chrono::{DateTime, TimeZone, Utc};

    fn fixed_clock() -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000, 0).unwrap()
    }

    #[test]
    fn create_prepends_newest_first() {
        let service = NoteService::with_clock(InMemoryNoteRepository::new(), fixed_clock);
        let first = service.create("first", "").unwrap();
        let second = service.create("second", "").unwrap();

        let all = service.list(Default::default()).unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
        assert_eq!(first.created_at, fixed_clock());
    }

    #[test]
    fn state_machine_rejects_out_of_order_transitions() {
        let service = NoteService::new(InMemoryNoteRepository::new());
        let note = service.create("chores", "").unwrap();

        let err = service.restore(&note.id).unwrap_err();
        assert!(matches!(
            err,
            NoteServiceError::InvalidTransition {
                state: NoteState::Active,
                operation: "restore",
                ..
            }
        ));
        assert!(service.purge(&note.id).is_err());

        service.soft_delete(&note.id).unwrap();
        assert!(matches!(
            service.set_completed(&note.id, true).unwrap_err(),
            NoteServiceError::InvalidTransition { .. }
        ));
        assert!(matches!(
            service.update(&note.id, Some("other"), None).unwrap_err(),
            NoteServiceError::InvalidTransition { .. }
        ));
        assert!(matches!(
            service.soft_delete(&note.id).unwrap_err(),
            NoteServiceError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn repeated_completion_does_not_grow_history() {
        let service = NoteService::new(InMemoryNoteRepository::new());
        let note = service.create("chores", "").unwrap();
        service.set_completed(&note.id, true).unwrap();
        let again = service.set_completed(&note.id, true).unwrap();
        assert_eq!(again.history.len(), 1);
    }
}
