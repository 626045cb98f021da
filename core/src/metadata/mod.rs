//! External book-catalog integration: search client and record mapping.

pub mod google;
pub mod mapper;

pub use google::{GoogleBooksClient, ImageLinks, Volume, VolumeInfo, isbn_query};
pub use mapper::book_draft_from_volume;

pub type Result<T> = crate::Result<T>;
