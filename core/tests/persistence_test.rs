use std::sync::Arc;

use shelf_core::store::{BlobStore, FileBlobStore, LIBRARY_KEY, MemoryBlobStore};
use shelf_core::store::{decode_library, encode_library};
use shelf_core::{BookDraft, CatalogStore, NoteDraft, ReadingStatus, SessionDraft};

fn draft(id: &str) -> BookDraft {
    BookDraft {
        id: id.into(),
        title: "Title".into(),
        author: "Author".into(),
        cover_url: "https://img/cover".into(),
        total_pages: 321,
        current_page: 0,
        status: ReadingStatus::WantToRead,
    }
}

#[test]
fn encode_decode_round_trips_the_collection() {
    let catalog = CatalogStore::open(Arc::new(MemoryBlobStore::new()));
    catalog.add_book(draft("b1"));
    catalog.add_book(draft("b2"));
    catalog.update_progress(
        "b1",
        40,
        Some(SessionDraft { duration_secs: 600, start_page: Some(10), end_page: Some(40) }),
    );
    catalog.add_session(
        "b1",
        SessionDraft { duration_secs: 120, start_page: None, end_page: None },
    );
    catalog.add_note("b1", NoteDraft { content: "margin note".into(), page: Some(12) });

    let books = catalog.books();
    let raw = encode_library(&books).expect("encode");
    let decoded = decode_library(&raw).expect("decode");

    assert_eq!(decoded, books);
    // Session order is insertion order and must survive the trip.
    assert_eq!(decoded[0].sessions[0].duration_secs, 600);
    assert_eq!(decoded[0].sessions[1].duration_secs, 120);
}

#[test]
fn mutations_write_through_to_the_blob_store() {
    let blob = Arc::new(MemoryBlobStore::new());
    let catalog = CatalogStore::open(blob.clone());
    catalog.add_book(draft("b1"));
    catalog.update_progress("b1", 321, None);
    catalog.flush();

    let raw = blob.get(LIBRARY_KEY).unwrap().expect("snapshot persisted");
    let persisted = decode_library(&raw).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].status, ReadingStatus::Finished);
}

#[test]
fn collection_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");

    let before = {
        let catalog = CatalogStore::open(Arc::new(FileBlobStore::at_path(path.clone())));
        catalog.add_book(draft("b1"));
        catalog.add_book(draft("b2"));
        catalog.update_progress("b2", 100, None);
        catalog.add_session(
            "b2",
            SessionDraft { duration_secs: 450, start_page: None, end_page: None },
        );
        catalog.flush();
        catalog.books()
    };

    let reopened = CatalogStore::open(Arc::new(FileBlobStore::at_path(path)));
    assert_eq!(reopened.books(), before);
}

#[test]
fn missing_blob_means_first_run() {
    let catalog = CatalogStore::open(Arc::new(MemoryBlobStore::new()));
    assert!(catalog.books().is_empty());
}

#[test]
fn corrupt_blob_means_first_run() {
    let blob = Arc::new(MemoryBlobStore::new());
    blob.set(LIBRARY_KEY, "][ not a library").unwrap();

    let catalog = CatalogStore::open(blob);
    assert!(catalog.books().is_empty());

    // The store stays fully usable; the bad blob is simply overwritten.
    assert!(catalog.add_book(draft("b1")));
    assert_eq!(catalog.books().len(), 1);
}

#[test]
fn legacy_session_shapes_load_and_rewrite_canonically() {
    let blob = Arc::new(MemoryBlobStore::new());
    blob.set(
        LIBRARY_KEY,
        r#"{"books":[{
            "id":"b1","title":"T","author":"A","status":"reading",
            "totalPages":200,"currentPage":80,"addedAtMs":1,
            "sessions":[
                {"date":5000,"durationSeconds":600,"startPage":10,"endPage":25},
                {"startedAt":9000,"duration":120,"pagesRead":8}
            ]
        }]}"#,
    )
    .unwrap();

    let catalog = CatalogStore::open(blob.clone());
    let book = catalog.book("b1").expect("book loaded");
    assert_eq!(book.sessions.len(), 2);
    assert_eq!(book.sessions[0].duration_secs, 600);
    assert_eq!(book.sessions[1].duration_secs, 120);

    // Any mutation persists the normalized layout.
    catalog.update_progress("b1", 90, None);
    catalog.flush();
    let raw = blob.get(LIBRARY_KEY).unwrap().unwrap();
    assert!(raw.contains("durationSecs"));
    assert!(!raw.contains("durationSeconds"));
}
