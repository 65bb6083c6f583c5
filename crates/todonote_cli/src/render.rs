//! Plain-text rendering of notes for terminal output.
//!
//! # Responsibility
//! - Turn note values into display lines; no storage access.
//!
//! # Invariants
//! - Rendering is pure; the same notes always produce the same text.

use chrono::{DateTime, SecondsFormat, Utc};
use todonote_core::view::filter::{completed_at, deleted_at};
use todonote_core::{HistoryAction, HistoryEntry, Note, NoteState, NoteView};

/// Renders one list line per note, with the view-specific timestamp.
pub fn render_list(notes: &[Note], view: NoteView) -> String {
    if notes.is_empty() {
        return format!("No {} notes.\n", view_label(view));
    }

    let mut out = String::new();
    for note in notes {
        let marker = match note.state() {
            NoteState::Active => "[ ]",
            NoteState::Completed => "[x]",
            NoteState::Deleted => "[-]",
        };
        out.push_str(&format!("{marker} {}  {}", note.id, note.title));
        let stamp = match note.state() {
            NoteState::Completed => completed_at(note).map(|at| ("completed", at)),
            NoteState::Deleted => deleted_at(note).map(|at| ("deleted", at)),
            NoteState::Active => None,
        };
        if let Some((label, at)) = stamp {
            out.push_str(&format!("  ({label} {})", timestamp(at)));
        }
        out.push('\n');
    }
    out
}

/// Renders a single note with its body and metadata.
pub fn render_note(note: &Note) -> String {
    let mut out = format!(
        "{}\n  id:      {}\n  state:   {}\n  created: {}\n  updated: {}\n",
        note.title,
        note.id,
        note.state(),
        timestamp(note.created_at),
        timestamp(note.updated_at),
    );
    if let Some(at) = note.deleted_at {
        out.push_str(&format!("  deleted: {}\n", timestamp(at)));
    }
    if !note.body.is_empty() {
        out.push('\n');
        for line in note.body.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

/// Renders the audit history, oldest first.
pub fn render_history(note: &Note) -> String {
    if note.history.is_empty() {
        return "No history.\n".to_string();
    }
    note.history.iter().map(render_history_entry).collect()
}

fn render_history_entry(entry: &HistoryEntry) -> String {
    let at = timestamp(entry.timestamp);
    match &entry.action {
        HistoryAction::Edited { from, to } => {
            let mut line = format!("{at}  Edited");
            if from.title != to.title {
                line.push_str(&format!("  title: {:?} -> {:?}", from.title, to.title));
            }
            if from.body != to.body {
                line.push_str("  body changed");
            }
            line.push('\n');
            line
        }
        other => format!("{at}  {}\n", other.label()),
    }
}

fn view_label(view: NoteView) -> &'static str {
    match view {
        NoteView::All => "stored",
        other => other.as_str(),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
