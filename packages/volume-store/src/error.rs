use std::io;
use std::path::PathBuf;

/// Errors raised by [`JsonFileStore`](crate::JsonFileStore) and its transactions.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("record not found: {key}")]
    NotFound { key: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but is not a JSON object of records.
    #[error("corrupt store file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A persisted record does not match the store's record type.
    #[error("failed to decode record {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store file {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn not_found_display() {
        let e = StoreError::NotFound {
            key: "vol1".to_string(),
        };
        assert_eq!(format!("{}", e), "record not found: vol1");
        assert!(e.is_not_found());
    }

    #[test]
    fn io_error_keeps_source() {
        let e = StoreError::Io {
            path: PathBuf::from("/run/easyfuse/mntdb.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(format!("{}", e).contains("/run/easyfuse/mntdb.json"));
        assert!(StdError::source(&e).is_some());
        assert!(!e.is_not_found());
    }

    #[test]
    fn corrupt_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e = StoreError::Corrupt {
            path: PathBuf::from("db.json"),
            source,
        };
        assert!(format!("{}", e).starts_with("corrupt store file db.json"));
    }
}
