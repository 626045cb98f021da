//! Core library for the Shelf reading tracker.
//!
//! Owns the book collection, its durable persistence, and the translation of
//! external catalog records into collection entries. The UI shell holds one
//! [`CatalogStore`] behind an `Arc` and routes every read and mutation
//! through it.

#![deny(missing_debug_implementations)]

pub mod catalog;
pub mod log;
pub mod metadata;
pub mod store;
pub mod types;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub use catalog::{CatalogStore, ReadingStats};
pub use types::{
    Book, BookDraft, Note, NoteDraft, ReadingSession, ReadingStatus, SessionDraft,
};

/// Returns the version of the core crate for telemetry and debugging.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
