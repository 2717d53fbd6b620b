//! Transactions over a [`JsonFileStore`].

use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::mem;
use std::sync::MutexGuard;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::Document;
use crate::{JsonFileStore, StoreError};

/// An open transaction.
///
/// Holds the store lock until it is committed or dropped. Records read
/// through [`get`](Self::get) or [`get_mut`](Self::get_mut), and records
/// written with [`set`](Self::set), are "touched": they are re-encoded on
/// commit. Everything else is written back exactly as it was loaded.
pub struct Transaction<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    store: &'a JsonFileStore<T>,
    _guard: MutexGuard<'a, ()>,
    persisted: Document,
    touched: BTreeMap<String, T>,
    loaded: String,
    finished: bool,
}

impl<'a, T> Transaction<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(
        store: &'a JsonFileStore<T>,
        guard: MutexGuard<'a, ()>,
        persisted: Document,
        loaded: String,
    ) -> Self {
        Self {
            store,
            _guard: guard,
            persisted,
            touched: BTreeMap::new(),
            loaded,
            finished: false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.touched.contains_key(key) || self.persisted.contains_key(key)
    }

    /// All record names, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.touched
            .keys()
            .chain(self.persisted.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty() && self.persisted.is_empty()
    }

    /// Read a record, decoding it on first access.
    pub fn get(&mut self, key: &str) -> Result<&T, StoreError> {
        self.materialize(key).map(|record| &*record)
    }

    /// Mutable access to a record; changes are persisted on commit.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut T, StoreError> {
        self.materialize(key)
    }

    /// Read a record without marking it as touched.
    pub fn peek(&self, key: &str) -> Result<Cow<'_, T>, StoreError>
    where
        T: Clone,
    {
        if let Some(record) = self.touched.get(key) {
            return Ok(Cow::Borrowed(record));
        }
        let value = self.persisted.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })?;
        let record = T::deserialize(value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;
        Ok(Cow::Owned(record))
    }

    /// Insert or replace a record.
    pub fn set(&mut self, key: &str, record: T) {
        self.touched.insert(key.to_string(), record);
    }

    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let touched = self.touched.remove(key);
        let persisted = self.persisted.remove(key);
        if touched.is_none() && persisted.is_none() {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Persist the transaction and release the lock.
    ///
    /// Returns whether the file was rewritten.
    pub fn commit(mut self) -> Result<bool, StoreError> {
        self.finish()
    }

    fn materialize(&mut self, key: &str) -> Result<&mut T, StoreError> {
        match self.touched.entry(key.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let value = self.persisted.get(key).ok_or_else(|| StoreError::NotFound {
                    key: key.to_string(),
                })?;
                let record = T::deserialize(value).map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                })?;
                Ok(entry.insert(record))
            }
        }
    }

    fn finish(&mut self) -> Result<bool, StoreError> {
        self.finished = true;

        for (key, record) in mem::take(&mut self.touched) {
            let value = serde_json::to_value(&record)
                .map_err(|source| StoreError::Encode {
                    key: key.clone(),
                    source,
                })?;
            self.persisted.insert(key, value);
        }

        let rendered = self.store.render(&self.persisted)?;
        if rendered == self.loaded {
            log::trace!("Store {} unchanged", self.store.path().display());
            return Ok(false);
        }

        self.store.save(&rendered)?;
        self.loaded = rendered;
        Ok(true)
    }
}

impl<T> Drop for Transaction<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(error) = self.finish() {
            log::error!(
                "Failed to persist {} on drop: {}",
                self.store.path().display(),
                error
            );
        }
    }
}
