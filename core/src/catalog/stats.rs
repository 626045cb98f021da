//! Derived reading statistics.
//!
//! Nothing here is cached: a snapshot is computed from the current collection
//! whenever the UI asks, so the numbers always agree with the latest
//! mutation.

use serde::Serialize;

use crate::types::{Book, ReadingStatus};

/// Aggregate numbers shown on the stats screen.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    /// Books with status `finished`.
    pub finished_books: usize,
    /// Sum of `current_page` across all books.
    pub pages_read: u64,
    /// Total number of recorded sessions.
    pub session_count: usize,
    /// Sum of all session durations.
    pub total_duration_secs: u64,
}

impl ReadingStats {
    /// Compute a snapshot over the given collection.
    pub fn collect(books: &[Book]) -> Self {
        let mut stats = Self::default();
        for book in books {
            if book.status == ReadingStatus::Finished {
                stats.finished_books += 1;
            }
            stats.pages_read += u64::from(book.current_page);
            stats.session_count += book.sessions.len();
            stats.total_duration_secs += book
                .sessions
                .iter()
                .map(|session| session.duration_secs)
                .sum::<u64>();
        }
        stats
    }
}
