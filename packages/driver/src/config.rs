//! Driver configuration.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_MOUNT_ROOT: &str = "/run/easyfuse/mntpt";
pub const DEFAULT_DATABASE: &str = "/run/easyfuse/mntdb.json";

/// Overrides [`DEFAULT_MOUNT_ROOT`].
pub const MOUNT_ROOT_ENV: &str = "EASYFUSE_MOUNT_PATH";
/// Overrides [`DEFAULT_DATABASE`].
pub const DATABASE_ENV: &str = "EASYFUSE_MOUNT_DB";

/// Where volumes are mounted and where their state is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Each volume is mounted at `<mount_root>/<name>`.
    pub mount_root: PathBuf,
    /// The JSON database of volume records.
    pub database: PathBuf,
}

impl DriverConfig {
    pub fn new(mount_root: impl Into<PathBuf>, database: impl Into<PathBuf>) -> Self {
        Self {
            mount_root: mount_root.into(),
            database: database.into(),
        }
    }

    /// Defaults, overridden by `EASYFUSE_MOUNT_PATH` and `EASYFUSE_MOUNT_DB`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let pick = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        Self {
            mount_root: pick(MOUNT_ROOT_ENV, DEFAULT_MOUNT_ROOT),
            database: pick(DATABASE_ENV, DEFAULT_DATABASE),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MOUNT_ROOT, DEFAULT_DATABASE)
    }
}
