//! Device-local persistent key-value storage.
//!
//! Arbitrary string keys map to string values and survive app restarts. The
//! file-backed implementation keeps every entry in a single JSON document and
//! replaces it atomically on write, so a crash mid-write never leaves a
//! half-written blob behind.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

const APP_QUALIFIER: &str = "com";
const APP_ORGANISATION: &str = "Shelf";
const APP_NAME: &str = "shelf";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob storage I/O failure")]
    Io(#[from] io::Error),
    #[error("blob file is not valid JSON")]
    Malformed(#[from] serde_json::Error),
    #[error("unable to resolve application data directory")]
    NoDataDir,
}

/// String-keyed durable storage, the only persistence surface the core uses.
pub trait BlobStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, BlobError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), BlobError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BlobFile {
    entries: HashMap<String, String>,
}

/// File-backed [`BlobStore`] holding all entries in one JSON document.
#[derive(Debug)]
pub struct FileBlobStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBlobStore {
    /// Open the store at the platform data directory, creating it if needed.
    pub fn open_default() -> Result<Self, BlobError> {
        let dir = data_dir()?;
        fs::create_dir_all(&dir)?;
        Ok(Self::at_path(dir.join("storage.json")))
    }

    /// Open a store backed by an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path, lock: Mutex::new(()) }
    }

    fn read_file(&self) -> Result<BlobFile, BlobError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BlobFile::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_file(&self, file: &BlobFile) -> Result<(), BlobError> {
        let parent = match self.path.parent() {
            Some(parent) => parent,
            None => return Err(BlobError::NoDataDir),
        };
        fs::create_dir_all(parent)?;

        let data = serde_json::to_vec_pretty(file)?;
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(&data)?;
        temp.flush()?;

        let target = self.path.clone();
        match temp.persist(&target) {
            Ok(_) => Ok(()),
            Err(err) => {
                if err.error.kind() == io::ErrorKind::AlreadyExists {
                    if let Err(remove_err) = fs::remove_file(&target) {
                        if remove_err.kind() != io::ErrorKind::NotFound {
                            return Err(remove_err.into());
                        }
                    }
                    err.file
                        .persist(&target)
                        .map(|_| ())
                        .map_err(|persist_err| persist_err.error.into())
                } else {
                    Err(err.error.into())
                }
            }
        }
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, BlobError> {
        let _guard = self.lock.lock();
        let file = self.read_file()?;
        Ok(file.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BlobError> {
        let _guard = self.lock.lock();
        let mut file = self.read_file()?;
        file.entries.insert(key.to_string(), value.to_string());
        self.write_file(&file)
    }
}

/// In-memory [`BlobStore`] used by tests and previews.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, BlobError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BlobError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn data_dir() -> Result<PathBuf, BlobError> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANISATION, APP_NAME)
        .map(|dirs| dirs.data_dir().join("state"))
        .ok_or(BlobError::NoDataDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileBlobStore::at_path(dir.path().join("storage.json"));

        assert!(store.get("shelf.library").unwrap().is_none());
        store.set("shelf.library", "{\"books\":[]}").unwrap();
        assert_eq!(store.get("shelf.library").unwrap().as_deref(), Some("{\"books\":[]}"));
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileBlobStore::at_path(dir.path().join("storage.json"));

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn unrelated_keys_are_preserved_across_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileBlobStore::at_path(dir.path().join("storage.json"));

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn corrupt_file_surfaces_malformed_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        fs::write(&path, b"not json").unwrap();

        let store = FileBlobStore::at_path(path);
        assert!(matches!(store.get("k"), Err(BlobError::Malformed(_))));
    }
}
