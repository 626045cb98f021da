use std::sync::Arc;

use shelf_core::store::MemoryBlobStore;
use shelf_core::{BookDraft, CatalogStore, NoteDraft, ReadingStatus, SessionDraft};

fn catalog() -> CatalogStore {
    CatalogStore::open(Arc::new(MemoryBlobStore::new()))
}

fn draft(id: &str, total_pages: u32) -> BookDraft {
    BookDraft {
        id: id.into(),
        title: format!("Book {id}"),
        author: "Author".into(),
        cover_url: String::new(),
        total_pages,
        current_page: 0,
        status: ReadingStatus::WantToRead,
    }
}

fn timed(duration_secs: u64) -> SessionDraft {
    SessionDraft { duration_secs, start_page: None, end_page: None }
}

#[test]
fn added_books_are_retrievable_with_empty_history() {
    let catalog = catalog();
    for id in ["b1", "b2", "b3"] {
        assert!(catalog.add_book(draft(id, 100)));
    }

    for id in ["b1", "b2", "b3"] {
        let book = catalog.book(id).expect("book present");
        assert!(book.sessions.is_empty());
        assert!(book.notes.is_empty());
        assert!(book.added_at_ms > 0);
    }
    assert!(catalog.book("b4").is_none());
}

#[test]
fn finishing_transition_follows_page_count() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 100));

    catalog.update_progress("b1", 99, None);
    assert_eq!(catalog.book("b1").unwrap().status, ReadingStatus::Reading);

    catalog.update_progress("b1", 100, None);
    let book = catalog.book("b1").unwrap();
    assert_eq!(book.status, ReadingStatus::Finished);
    assert_eq!(book.current_page, 100);

    // Progress on a missing id leaves the collection untouched.
    assert!(!catalog.update_progress("missing", 50, None));
    assert_eq!(catalog.books().len(), 1);
    assert_eq!(catalog.book("b1").unwrap().current_page, 100);
}

#[test]
fn progress_update_can_record_the_session_that_caused_it() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 300));

    catalog.update_progress(
        "b1",
        60,
        Some(SessionDraft { duration_secs: 1200, start_page: Some(30), end_page: Some(60) }),
    );

    let book = catalog.book("b1").unwrap();
    assert_eq!(book.sessions.len(), 1);
    assert_eq!(book.sessions[0].duration_secs, 1200);
    assert_eq!(book.sessions[0].end_page, Some(60));
    assert!(book.sessions[0].started_at_ms > 0);
}

#[test]
fn repeated_sessions_get_distinct_ids() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 100));

    catalog.add_session("b1", timed(600));
    catalog.add_session("b1", timed(600));

    let sessions = catalog.book("b1").unwrap().sessions;
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0].id, sessions[1].id);
}

#[test]
fn delete_removes_exactly_one_entry() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 100));
    catalog.add_book(draft("b2", 100));
    catalog.add_session("b2", timed(300));
    catalog.add_note("b2", NoteDraft { content: "keep me".into(), page: None });

    assert!(catalog.delete_book("b1"));
    assert!(!catalog.delete_book("b1"));

    let books = catalog.books();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, "b2");
    assert_eq!(books[0].sessions.len(), 1);
    assert_eq!(books[0].notes.len(), 1);
}

#[test]
fn status_override_bypasses_progress_logic() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 100));
    catalog.update_progress("b1", 10, None);

    catalog.update_status("b1", ReadingStatus::Finished);
    assert_eq!(catalog.book("b1").unwrap().status, ReadingStatus::Finished);

    catalog.update_status("b1", ReadingStatus::WantToRead);
    assert_eq!(catalog.book("b1").unwrap().status, ReadingStatus::WantToRead);
}

#[test]
fn derived_stats_track_the_latest_mutation() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 100));
    catalog.add_book(draft("b2", 200));
    catalog.update_progress("b1", 50, None);
    catalog.update_progress("b2", 120, None);

    let stats = catalog.stats();
    assert_eq!(stats.pages_read, 170);
    assert_eq!(stats.finished_books, 0);

    catalog.update_progress("b1", 100, Some(timed(900)));
    let stats = catalog.stats();
    assert_eq!(stats.pages_read, 220);
    assert_eq!(stats.finished_books, 1);
    assert_eq!(stats.session_count, 1);
    assert_eq!(stats.total_duration_secs, 900);
}

#[test]
fn currently_reading_is_first_by_collection_order() {
    let catalog = catalog();
    catalog.add_book(draft("b1", 100));
    catalog.add_book(draft("b2", 100));

    assert!(catalog.currently_reading().is_none());
    catalog.update_progress("b2", 5, None);
    assert_eq!(catalog.currently_reading().unwrap().id, "b2");

    catalog.update_progress("b1", 5, None);
    assert_eq!(catalog.currently_reading().unwrap().id, "b1");
}
