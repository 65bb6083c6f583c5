//! View filters and list query parsing.

use crate::model::note::{HistoryAction, Note};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the list views offered by front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteView {
    /// Every non-purged note, deleted ones included.
    #[default]
    All,
    /// `!completed && !deleted`.
    Active,
    /// `completed && !deleted`.
    Completed,
    /// `deleted`, regardless of the completed flag.
    Deleted,
}

impl NoteView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }

    pub fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Active => !note.completed && !note.deleted,
            Self::Completed => note.completed && !note.deleted,
            Self::Deleted => note.deleted,
        }
    }
}

impl FromStr for NoteView {
    type Err = ViewParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            other => Err(ViewParseError::UnknownView(other.to_string())),
        }
    }
}

impl Display for NoteView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unparsable view or query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewParseError {
    UnknownView(String),
    UnknownStatus(String),
    InvalidDeletedFlag(String),
}

impl Display for ViewParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownView(value) => write!(
                f,
                "unknown view `{value}`; expected all|active|completed|deleted"
            ),
            Self::UnknownStatus(value) => {
                write!(f, "unknown status `{value}`; expected active|completed")
            }
            Self::InvalidDeletedFlag(value) => {
                write!(f, "invalid deleted flag `{value}`; expected true|false")
            }
        }
    }
}

impl Error for ViewParseError {}

/// `status` list parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Completed,
}

/// List query as exposed by `GET /api/notes?status=&deleted=`.
///
/// The deleted flag is applied first, then the status filter. Both status
/// values exclude deleted notes, so `status=active&deleted=true` is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub status: Option<StatusFilter>,
    pub deleted: Option<bool>,
}

impl NoteQuery {
    /// Parses raw query values. Absent or empty values impose no filter.
    pub fn parse(status: Option<&str>, deleted: Option<&str>) -> Result<Self, ViewParseError> {
        let status = match status.map(str::trim).filter(|value| !value.is_empty()) {
            None => None,
            Some("active") => Some(StatusFilter::Active),
            Some("completed") => Some(StatusFilter::Completed),
            Some(other) => return Err(ViewParseError::UnknownStatus(other.to_string())),
        };
        let deleted = match deleted.map(str::trim).filter(|value| !value.is_empty()) {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => return Err(ViewParseError::InvalidDeletedFlag(other.to_string())),
        };
        Ok(Self { status, deleted })
    }

    pub fn matches(&self, note: &Note) -> bool {
        let deleted_ok = self.deleted.map_or(true, |flag| note.deleted == flag);
        let status_ok = match self.status {
            None => true,
            Some(StatusFilter::Active) => NoteView::Active.matches(note),
            Some(StatusFilter::Completed) => NoteView::Completed.matches(note),
        };
        deleted_ok && status_ok
    }
}

impl From<NoteView> for NoteQuery {
    fn from(view: NoteView) -> Self {
        match view {
            NoteView::All => Self::default(),
            NoteView::Active => Self {
                status: Some(StatusFilter::Active),
                deleted: None,
            },
            NoteView::Completed => Self {
                status: Some(StatusFilter::Completed),
                deleted: None,
            },
            NoteView::Deleted => Self {
                status: None,
                deleted: Some(true),
            },
        }
    }
}

/// Returns the notes visible in `view`, preserving order.
pub fn apply_view(notes: &[Note], view: NoteView) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| view.matches(note))
        .cloned()
        .collect()
}

/// Returns the notes matching `query`, preserving order.
pub fn apply_query(notes: &[Note], query: &NoteQuery) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| query.matches(note))
        .cloned()
        .collect()
}

pub fn active(notes: &[Note]) -> Vec<Note> {
    apply_view(notes, NoteView::Active)
}

pub fn completed(notes: &[Note]) -> Vec<Note> {
    apply_view(notes, NoteView::Completed)
}

pub fn deleted(notes: &[Note]) -> Vec<Note> {
    apply_view(notes, NoteView::Deleted)
}

/// Timestamp of the latest `Completed` history entry.
pub fn completed_at(note: &Note) -> Option<DateTime<Utc>> {
    latest_action_at(note, |action| matches!(action, HistoryAction::Completed))
}

/// Timestamp of the latest `Deleted` history entry, falling back to
/// `deleted_at` for notes whose history predates it.
pub fn deleted_at(note: &Note) -> Option<DateTime<Utc>> {
    latest_action_at(note, |action| matches!(action, HistoryAction::Deleted))
        .or(note.deleted_at)
}

fn latest_action_at(
    note: &Note,
    is_match: impl Fn(&HistoryAction) -> bool,
) -> Option<DateTime<Utc>> {
    note.history
        .iter()
        .rev()
        .find(|entry| is_match(&entry.action))
        .map(|entry| entry.timestamp)
}
