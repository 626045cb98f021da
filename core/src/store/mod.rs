//! Durable persistence for the book collection.
//!
//! The whole collection is serialized as one JSON document, `{"books": [...]}`,
//! stored under a single fixed key in the device-local blob store. Loading
//! tolerates two older on-disk session shapes and normalizes them into the
//! current [`ReadingSession`] layout; an absent or unreadable blob is treated
//! as a first run.

pub mod blob;
pub mod writer;

pub use blob::{BlobError, BlobStore, FileBlobStore, MemoryBlobStore};
pub use writer::PersistWriter;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Book, Note, ReadingSession, ReadingStatus, generate_id};

/// The one key the collection lives under.
pub const LIBRARY_KEY: &str = "shelf.library";

#[derive(Serialize)]
struct LibrarySnapshot<'a> {
    books: &'a [Book],
}

#[derive(Deserialize)]
struct LibraryFile {
    #[serde(default)]
    books: Vec<StoredBook>,
}

/// On-disk book shape; identical to [`Book`] except that sessions may still be
/// in a legacy layout.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBook {
    id: String,
    title: String,
    author: String,
    #[serde(default)]
    cover_url: String,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    current_page: u32,
    status: ReadingStatus,
    added_at_ms: u64,
    #[serde(default)]
    sessions: Vec<StoredSession>,
    #[serde(default)]
    notes: Vec<Note>,
}

/// The three session layouts that have existed on disk. Earlier app versions
/// wrote either `{startedAt, duration, pagesRead}` or
/// `{date, durationSeconds, startPage, endPage}`; both are accepted on load
/// and rewritten in the current layout on the next persist.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSession {
    Current(ReadingSession),
    #[serde(rename_all = "camelCase")]
    Logged {
        #[serde(default)]
        id: Option<String>,
        date: u64,
        duration_seconds: u64,
        #[serde(default)]
        start_page: Option<u32>,
        #[serde(default)]
        end_page: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Timed {
        #[serde(default)]
        id: Option<String>,
        started_at: u64,
        duration: u64,
        #[serde(default)]
        pages_read: Option<u32>,
    },
}

impl From<StoredSession> for ReadingSession {
    fn from(stored: StoredSession) -> Self {
        match stored {
            StoredSession::Current(session) => session,
            StoredSession::Logged { id, date, duration_seconds, start_page, end_page } => {
                ReadingSession {
                    id: id.unwrap_or_else(|| generate_id(date)),
                    started_at_ms: date,
                    duration_secs: duration_seconds,
                    start_page,
                    end_page,
                }
            }
            StoredSession::Timed { id, started_at, duration, pages_read } => ReadingSession {
                id: id.unwrap_or_else(|| generate_id(started_at)),
                started_at_ms: started_at,
                duration_secs: duration,
                // A bare page count has no anchor; keep it as a zero-based span.
                start_page: pages_read.map(|_| 0),
                end_page: pages_read,
            },
        }
    }
}

impl From<StoredBook> for Book {
    fn from(stored: StoredBook) -> Self {
        Book {
            id: stored.id,
            title: stored.title,
            author: stored.author,
            cover_url: stored.cover_url,
            total_pages: stored.total_pages,
            current_page: stored.current_page,
            status: stored.status,
            added_at_ms: stored.added_at_ms,
            sessions: stored.sessions.into_iter().map(ReadingSession::from).collect(),
            notes: stored.notes,
        }
    }
}

/// Serialize the collection into the persisted document form.
pub fn encode_library(books: &[Book]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&LibrarySnapshot { books })
}

/// Parse a persisted document back into the collection, normalizing legacy
/// session layouts.
pub fn decode_library(raw: &str) -> Result<Vec<Book>, serde_json::Error> {
    let file: LibraryFile = serde_json::from_str(raw)?;
    Ok(file.books.into_iter().map(Book::from).collect())
}

/// Read the collection at startup. Missing, unreadable, or unparseable data
/// all fall back to an empty collection; a first run and a corrupt blob are
/// indistinguishable by design.
pub fn load_library(store: &dyn BlobStore) -> Vec<Book> {
    let raw = match store.get(LIBRARY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "failed to read persisted library; starting empty");
            return Vec::new();
        }
    };

    match decode_library(&raw) {
        Ok(books) => books,
        Err(err) => {
            warn!(error = %err, "persisted library is unparseable; starting empty");
            Vec::new()
        }
    }
}
