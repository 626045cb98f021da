//! The book collection and every operation that touches it.
//!
//! [`CatalogStore`] is the single source of truth: one process-wide instance
//! is created at launch, shared by `Arc`, and every read and write goes
//! through it. Mutations run to completion under the collection lock and then
//! hand a serialized snapshot to the persistence writer, so readers never see
//! a half-applied change and the caller never waits on the disk.

pub mod stats;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::store::{self, BlobStore, LIBRARY_KEY, PersistWriter};
use crate::types::{
    Book, BookDraft, Note, NoteDraft, ReadingSession, ReadingStatus, SessionDraft, generate_id,
    now_ms,
};

pub use stats::ReadingStats;

/// Single source of truth for the user's collection.
///
/// Mutations referencing an id that is not in the collection are silent
/// no-ops: they return `false` and leave everything untouched. The UI must
/// survive stale ids (for example navigating to a just-deleted book), so no
/// mutation ever panics or surfaces an error.
#[derive(Debug)]
pub struct CatalogStore {
    books: Mutex<Vec<Book>>,
    writer: PersistWriter,
}

impl CatalogStore {
    /// Rehydrate the collection from the blob store and start the
    /// persistence writer. A missing or corrupt blob means a first run.
    pub fn open(blob: Arc<dyn BlobStore>) -> Self {
        let books = store::load_library(&*blob);
        debug!(count = books.len(), "library loaded");
        let writer = PersistWriter::spawn(blob, LIBRARY_KEY);
        Self { books: Mutex::new(books), writer }
    }

    /// Append a new book. Rejects an id already present in the collection so
    /// book ids stay unique; the caller is expected to check for an existing
    /// entry first, so a duplicate here is a stale double-add.
    pub fn add_book(&self, draft: BookDraft) -> bool {
        self.mutate(|books| {
            if books.iter().any(|book| book.id == draft.id) {
                debug!(book = %draft.id, "duplicate add rejected");
                return false;
            }
            books.push(Book::from_draft(draft, now_ms()));
            true
        })
    }

    /// Move the furthest-read position and recompute the status: reaching the
    /// last page finishes the book, anything short of it marks it as being
    /// read. Optionally records the reading session that produced the change.
    pub fn update_progress(
        &self,
        id: &str,
        current_page: u32,
        session: Option<SessionDraft>,
    ) -> bool {
        self.mutate(|books| {
            let Some(book) = books.iter_mut().find(|book| book.id == id) else {
                debug!(book = id, "progress update for unknown book ignored");
                return false;
            };

            book.current_page = current_page;
            book.status = if book.total_pages > 0 && current_page >= book.total_pages {
                ReadingStatus::Finished
            } else {
                ReadingStatus::Reading
            };

            if let Some(draft) = session {
                book.sessions.push(materialize_session(draft));
            }
            true
        })
    }

    /// Set the status directly, bypassing the progress-derived transition.
    pub fn update_status(&self, id: &str, status: ReadingStatus) -> bool {
        self.mutate(|books| match books.iter_mut().find(|book| book.id == id) {
            Some(book) => {
                book.status = status;
                true
            }
            None => false,
        })
    }

    /// Remove a book together with its embedded sessions and notes.
    pub fn delete_book(&self, id: &str) -> bool {
        self.mutate(|books| {
            let before = books.len();
            books.retain(|book| book.id != id);
            books.len() != before
        })
    }

    /// Record a completed reading interval against a book.
    pub fn add_session(&self, book_id: &str, draft: SessionDraft) -> bool {
        self.mutate(|books| match books.iter_mut().find(|book| book.id == book_id) {
            Some(book) => {
                book.sessions.push(materialize_session(draft));
                true
            }
            None => false,
        })
    }

    /// Attach a note to a book.
    pub fn add_note(&self, book_id: &str, draft: NoteDraft) -> bool {
        self.mutate(|books| match books.iter_mut().find(|book| book.id == book_id) {
            Some(book) => {
                let now = now_ms();
                book.notes.push(Note {
                    id: generate_id(now),
                    content: draft.content,
                    page: draft.page,
                    created_at_ms: now,
                });
                true
            }
            None => false,
        })
    }

    /// Remove a single note by id.
    pub fn delete_note(&self, book_id: &str, note_id: &str) -> bool {
        self.mutate(|books| match books.iter_mut().find(|book| book.id == book_id) {
            Some(book) => {
                let before = book.notes.len();
                book.notes.retain(|note| note.id != note_id);
                book.notes.len() != before
            }
            None => false,
        })
    }

    /// Look up a single book. Pure read, no side effects.
    pub fn book(&self, id: &str) -> Option<Book> {
        self.books.lock().iter().find(|book| book.id == id).cloned()
    }

    /// Snapshot of the whole collection in insertion order.
    pub fn books(&self) -> Vec<Book> {
        self.books.lock().clone()
    }

    /// The first book (by collection order) currently being read.
    pub fn currently_reading(&self) -> Option<Book> {
        self.books.lock().iter().find(|book| book.status == ReadingStatus::Reading).cloned()
    }

    /// Derived statistics, recomputed from the live collection on every call.
    pub fn stats(&self) -> ReadingStats {
        ReadingStats::collect(&self.books.lock())
    }

    /// Block until every mutation so far is durably written. Meant for
    /// orderly shutdown; normal mutations never wait on this.
    pub fn flush(&self) {
        self.writer.flush();
    }

    fn mutate<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut Vec<Book>) -> bool,
    {
        let mut books = self.books.lock();
        let changed = apply(&mut books);
        if changed {
            match store::encode_library(&books) {
                Ok(snapshot) => self.writer.enqueue(snapshot),
                Err(err) => warn!(error = %err, "failed to serialize library snapshot"),
            }
        }
        changed
    }
}

fn materialize_session(draft: SessionDraft) -> ReadingSession {
    let now = now_ms();
    ReadingSession {
        id: generate_id(now),
        // Sessions are recorded when they end; date them back to their start.
        started_at_ms: now.saturating_sub(draft.duration_secs.saturating_mul(1_000)),
        duration_secs: draft.duration_secs,
        start_page: draft.start_page,
        end_page: draft.end_page,
    }
}
