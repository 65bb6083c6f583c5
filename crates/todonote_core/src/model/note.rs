//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its audit history.
//! - Provide in-place lifecycle helpers used by the note service.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` is trimmed and never empty.
//! - `history` is append-only; helpers only ever push to it.
//! - A note is in exactly one `NoteState`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for every note.
///
/// New notes get a UUID v4 string. Ids loaded from existing documents are
/// kept verbatim, so older stores with short random ids still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts any id that is non-empty after trimming.
    pub fn parse(raw: &str) -> Result<Self, NoteIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NoteIdError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = NoteIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for NoteId {
    type Error = NoteIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NoteId> for String {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

/// Rejected note id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteIdError {
    Empty,
}

impl Display for NoteIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "note id must not be empty"),
        }
    }
}

impl Error for NoteIdError {}

/// Lifecycle state derived from the `completed` and `deleted` flags.
///
/// Purged notes have no state: they no longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteState {
    /// Open to-do item.
    Active,
    /// Marked done, still visible in the completed view.
    Completed,
    /// Soft-deleted; restorable until purged.
    Deleted,
}

impl NoteState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }
}

impl Display for NoteState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for note write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title required"),
        }
    }
}

impl Error for NoteValidationError {}

/// User-editable content of a note, as captured by `Edited` history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteContent {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// What happened to a note at one point in time.
///
/// Only `Edited` carries a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    Created,
    Edited { from: NoteContent, to: NoteContent },
    Completed,
    MarkedActive,
    Deleted,
    Recovered,
}

impl HistoryAction {
    /// Returns the serialized `action` tag.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Edited { .. } => "Edited",
            Self::Completed => "Completed",
            Self::MarkedActive => "MarkedActive",
            Self::Deleted => "Deleted",
            Self::Recovered => "Recovered",
        }
    }
}

/// Immutable audit record of a state or content change.
///
/// Serialized as `{timestamp, action, from?, to?}` where `from`/`to` only
/// appear for `Edited`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HistoryEntryWire", into = "HistoryEntryWire")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
}

impl HistoryEntry {
    pub fn new(timestamp: DateTime<Utc>, action: HistoryAction) -> Self {
        Self { timestamp, action }
    }
}

/// Flat on-disk shape of a history entry.
///
/// Older files carry edits without an `action` tag, and the local-storage
/// front-end spelled `MarkedActive` as `"Marked Active"`; both still load.
#[derive(Serialize, Deserialize)]
struct HistoryEntryWire {
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<NoteContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<NoteContent>,
}

impl TryFrom<HistoryEntryWire> for HistoryEntry {
    type Error = String;

    fn try_from(wire: HistoryEntryWire) -> Result<Self, Self::Error> {
        let action = match (wire.action.as_deref(), wire.from, wire.to) {
            (Some("Edited") | None, Some(from), Some(to)) => HistoryAction::Edited { from, to },
            (Some("Edited"), _, _) => {
                return Err("edit history entry requires both `from` and `to`".to_string());
            }
            (None, _, _) => return Err("history entry is missing `action`".to_string()),
            (Some("Created"), _, _) => HistoryAction::Created,
            (Some("Completed"), _, _) => HistoryAction::Completed,
            (Some("MarkedActive" | "Marked Active"), _, _) => HistoryAction::MarkedActive,
            (Some("Deleted"), _, _) => HistoryAction::Deleted,
            (Some("Recovered"), _, _) => HistoryAction::Recovered,
            (Some(other), _, _) => return Err(format!("unknown history action `{other}`")),
        };

        Ok(Self {
            timestamp: wire.timestamp,
            action,
        })
    }
}

impl From<HistoryEntry> for HistoryEntryWire {
    fn from(entry: HistoryEntry) -> Self {
        let label = entry.action.label().to_string();
        let (from, to) = match entry.action {
            HistoryAction::Edited { from, to } => (Some(from), Some(to)),
            _ => (None, None),
        };
        Self {
            timestamp: entry.timestamp,
            action: Some(label),
            from,
            to,
        }
    }
}

/// Canonical to-do note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Note {
    /// Creates a new active note with a generated stable ID.
    ///
    /// # Invariants
    /// - `title` is trimmed; an empty result is rejected.
    /// - `created_at == updated_at` and `history` starts empty.
    pub fn new(
        title: &str,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        Self::with_id(NoteId::generate(), title, body, now)
    }

    /// Creates a new active note with a caller-provided stable ID.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: NoteId,
        title: &str,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        Ok(Self {
            id,
            title: normalize_title(title)?,
            body: body.into(),
            created_at: now,
            updated_at: now,
            completed: false,
            deleted: false,
            deleted_at: None,
            history: Vec::new(),
        })
    }

    /// Checks invariants that must hold for persisted notes.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn state(&self) -> NoteState {
        if self.deleted {
            NoteState::Deleted
        } else if self.completed {
            NoteState::Completed
        } else {
            NoteState::Active
        }
    }

    pub fn content(&self) -> NoteContent {
        NoteContent {
            title: self.title.clone(),
            body: self.body.clone(),
        }
    }

    /// Applies a partial content edit.
    ///
    /// Returns `Ok(true)` when title or body changed, in which case exactly
    /// one `Edited` entry is appended. Unchanged input leaves the note
    /// untouched, `updated_at` included.
    pub fn apply_edit(
        &mut self,
        title: Option<&str>,
        body: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, NoteValidationError> {
        let next_title = match title {
            Some(value) => normalize_title(value)?,
            None => self.title.clone(),
        };
        let next_body = body.map_or_else(|| self.body.clone(), str::to_string);

        if next_title == self.title && next_body == self.body {
            return Ok(false);
        }

        let to = NoteContent {
            title: next_title,
            body: next_body,
        };
        let from = self.content();
        self.title = to.title.clone();
        self.body = to.body.clone();
        self.updated_at = now;
        self.push_history(now, HistoryAction::Edited { from, to });
        Ok(true)
    }

    /// Sets the completed flag, recording the transition.
    ///
    /// Returns `false` without touching the note when the flag already has
    /// the requested value.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> bool {
        if self.completed == completed {
            return false;
        }

        self.completed = completed;
        self.updated_at = now;
        let action = if completed {
            HistoryAction::Completed
        } else {
            HistoryAction::MarkedActive
        };
        self.push_history(now, action);
        true
    }

    /// Marks this note as softly deleted.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
        self.push_history(now, HistoryAction::Deleted);
    }

    /// Clears the soft delete flag. The completed flag is left as it was.
    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.deleted = false;
        self.deleted_at = None;
        self.updated_at = now;
        self.push_history(now, HistoryAction::Recovered);
    }

    fn push_history(&mut self, timestamp: DateTime<Utc>, action: HistoryAction) {
        self.history.push(HistoryEntry::new(timestamp, action));
    }
}

fn normalize_title(title: &str) -> Result<String, NoteValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
