//! Translation from catalog records to the shape `add_book` accepts.
//!
//! The mapping is total: any record, however sparse, produces a usable draft.

use crate::types::{BookDraft, ReadingStatus, upgrade_to_https};

use super::google::Volume;

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Map a catalog record to a draft ready for the store. The volume id passes
/// through as the book id; everything else falls back to a default when the
/// record omits it.
pub fn book_draft_from_volume(volume: &Volume) -> BookDraft {
    let info = &volume.volume_info;

    let title = match info.title.as_deref() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => UNKNOWN_TITLE.to_string(),
    };

    let author = match info.authors.as_deref() {
        Some(authors) if !authors.is_empty() => authors.join(", "),
        _ => UNKNOWN_AUTHOR.to_string(),
    };

    BookDraft {
        id: volume.id.clone(),
        title,
        author,
        cover_url: upgrade_to_https(best_cover(volume)),
        total_pages: info.page_count.unwrap_or(0),
        current_page: 0,
        status: ReadingStatus::WantToRead,
    }
}

// Largest available resolution wins.
fn best_cover(volume: &Volume) -> String {
    let Some(links) = &volume.volume_info.image_links else {
        return String::new();
    };

    [
        &links.extra_large,
        &links.large,
        &links.medium,
        &links.small,
        &links.thumbnail,
        &links.small_thumbnail,
    ]
    .into_iter()
    .find_map(|link| link.clone())
    .unwrap_or_default()
}
