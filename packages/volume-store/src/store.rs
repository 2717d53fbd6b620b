//! The store handle: file location and the single-writer lock.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{StoreError, Transaction};

/// Records as persisted: decoded JSON, keyed by record name.
pub(crate) type Document = BTreeMap<String, JsonValue>;

/// A record store backed by one JSON file.
///
/// The file holds a single object mapping record names to records. Every
/// transaction takes the same exclusive lock, so transactions never overlap,
/// whichever records they touch.
pub struct JsonFileStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store for `path`. Nothing is read until a transaction begins.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the lock and load the file.
    ///
    /// Blocks until no other transaction is open. If loading fails the lock
    /// is released before the error is returned.
    pub fn begin(&self) -> Result<Transaction<'_, T>, StoreError> {
        // The mutex guards no data; the state lives in the file.
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let document = self.load()?;
        let rendered = self.render(&document)?;
        Ok(Transaction::new(self, guard, document, rendered))
    }

    /// Run `body` inside a transaction and commit it afterwards.
    ///
    /// The commit happens even when `body` fails, so partial updates made
    /// before the failure are persisted. The body's error takes precedence
    /// over a commit error.
    pub fn transaction<R, E, F>(&self, body: F) -> Result<R, E>
    where
        F: FnOnce(&mut Transaction<'_, T>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut tx = self.begin()?;
        let result = body(&mut tx);
        match (result, tx.commit()) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(error)) => Err(error.into()),
            (Err(error), Ok(_)) => Err(error),
            (Err(error), Err(commit_error)) => {
                log::error!(
                    "Failed to persist {} after a failed transaction: {}",
                    self.path.display(),
                    commit_error
                );
                Err(error)
            }
        }
    }

    fn load(&self) -> Result<Document, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::debug!("Store {} not found, starting empty", self.path.display());
                return Ok(Document::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        log::debug!("Loaded store {} -> {}", self.path.display(), contents);
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Canonical rendering: pretty-printed, keys sorted at every level.
    pub(crate) fn render(&self, document: &Document) -> Result<String, StoreError> {
        let mut rendered =
            serde_json::to_string_pretty(document).map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Replace the file by writing a sibling and renaming it into place.
    pub(crate) fn save(&self, contents: &str) -> Result<(), StoreError> {
        log::debug!("Saving store {} <- {}", self.path.display(), contents);

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        let mut file = fs::File::create(&staging).map_err(io_error(&staging))?;
        file.write_all(contents.as_bytes())
            .map_err(io_error(&staging))?;
        file.sync_all().map_err(io_error(&staging))?;
        drop(file);

        fs::rename(&staging, &self.path).map_err(io_error(&self.path))
    }
}
