use std::io;
use std::path::PathBuf;

use easyfuse_command_template::ParseError;
use easyfuse_volume_store::StoreError;

use crate::RunError;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("volume {name} not found")]
    NotFound { name: String },

    #[error("instance {instance} not found on volume {name}")]
    InstanceNotFound { name: String, instance: String },

    #[error("volume {name} already exists, remove it first")]
    AlreadyExists { name: String },

    #[error("invalid command template: {0}")]
    Parse(#[from] ParseError),

    #[error("command `{}` failed: {source}", argv.join(" "))]
    ProcessExecution {
        argv: Vec<String>,
        #[source]
        source: RunError,
    },

    #[error("missing option: {option}")]
    MissingOption { option: String },

    #[error("invalid volume name: {name:?}")]
    InvalidName { name: String },

    #[error("failed to manage directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl DriverError {
    /// True for a missing volume and for a missing instance on a volume.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DriverError::NotFound { .. } | DriverError::InstanceNotFound { .. }
        )
    }
}

impl From<StoreError> for DriverError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { key } => DriverError::NotFound { name: key },
            other => DriverError::Store(other),
        }
    }
}
