//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the load/save contract the note service is written against.
//! - Isolate file and serialization details from business orchestration.
//!
//! # Invariants
//! - Repositories persist whole documents; there are no partial writes.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod note_repo;
