//! Transactional record store persisted to a single JSON file.
//!
//! All access goes through a [`Transaction`], which holds the store's one
//! process-wide lock for its whole lifetime:
//! - the file is loaded when the transaction begins (a missing file is empty)
//! - records are decoded lazily, on first access
//! - on commit the full state is re-rendered with sorted keys, and the file
//!   is only rewritten when the rendering differs from what was loaded
//!
//! There is no rollback. A transaction that is dropped, or whose body fails
//! inside [`JsonFileStore::transaction`], still persists what it staged.
//!
//! # Example
//!
//! ```rust,no_run
//! use easyfuse_volume_store::{JsonFileStore, StoreError};
//!
//! let store: JsonFileStore<u64> = JsonFileStore::new("/run/example/counters.json");
//!
//! store
//!     .transaction(|tx| {
//!         if !tx.contains("hits") {
//!             tx.set("hits", 0);
//!         }
//!         *tx.get_mut("hits")? += 1;
//!         Ok::<_, StoreError>(())
//!     })
//!     .unwrap();
//! ```

mod error;
mod store;
mod transaction;

pub use error::StoreError;
pub use store::JsonFileStore;
pub use transaction::Transaction;
