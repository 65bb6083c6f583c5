//! Domain model for to-do notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one note shape shared by the server and local front-ends.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Soft deletion is a flag on the note; only purge removes the record.

pub mod note;
