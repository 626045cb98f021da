//! Shared data structures exchanged between the core, app shell, and UI layers.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Where a book sits in the reader's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    WantToRead,
    Reading,
    Finished,
}

/// One entry in the user's collection.
///
/// `id` equals the external catalog's volume identifier when the book was
/// added via search or scan, otherwise a locally generated id. Unique within
/// the collection. `added_at_ms` is set once at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub total_pages: u32,
    pub current_page: u32,
    pub status: ReadingStatus,
    pub added_at_ms: u64,
    #[serde(default)]
    pub sessions: Vec<ReadingSession>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Book {
    /// Materialize a draft into a collection entry at the given creation time.
    pub fn from_draft(draft: BookDraft, added_at_ms: u64) -> Self {
        Self {
            id: draft.id,
            title: draft.title,
            author: draft.author,
            cover_url: upgrade_to_https(draft.cover_url),
            total_pages: draft.total_pages,
            current_page: draft.current_page,
            status: draft.status,
            added_at_ms,
            sessions: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Input accepted by `add_book`: everything except the fields the store owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    pub status: ReadingStatus,
}

/// One completed reading interval. Immutable once created; only ever appended
/// to a book or removed together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub id: String,
    pub started_at_ms: u64,
    pub duration_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_page: Option<u32>,
}

/// Session input without the store-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub duration_secs: u64,
    #[serde(default)]
    pub start_page: Option<u32>,
    #[serde(default)]
    pub end_page: Option<u32>,
}

/// Free-text annotation attached to a book, independently deletable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub created_at_ms: u64,
}

/// Note input without the store-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub content: String,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Generate an identifier for an embedded entity (session, note, local book).
///
/// Time component plus a random suffix. Collisions are negligible in practice
/// but not cryptographically excluded; the store treats ids as unique.
pub fn generate_id(now: u64) -> String {
    format!("{:x}-{:04x}", now, rand::random::<u16>())
}

/// Rewrite an insecure cover URL scheme to https before storage.
pub fn upgrade_to_https(url: String) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url,
    }
}
