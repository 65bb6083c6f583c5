//! Read-side projections over the note collection.
//!
//! # Responsibility
//! - Derive the active/completed/deleted views from one note list.
//! - Parse HTTP-style list queries into filters.
//!
//! # Invariants
//! - Filters are pure and preserve input order.
//! - The active, completed and deleted views are pairwise disjoint.

pub mod filter;
