//! Volume driver for mount-command-backed volumes.
//!
//! A volume is a named mount command (by default a FUSE `mount -t fuse`)
//! plus the set of instances currently using it. The driver keeps volume
//! records in a JSON database and reference-counts mounts:
//! - the first instance to mount a volume runs its mount command
//! - the last instance to unmount it runs its unmount command
//!
//! Commands are built from templates (see [`easyfuse_command_template`]) and
//! executed through a [`CommandRunner`].
//!
//! # Example
//!
//! ```rust,no_run
//! use easyfuse_driver::{Driver, DriverConfig, MountOptions};
//!
//! let driver = Driver::new(DriverConfig::from_env()).unwrap();
//! driver
//!     .create("data", MountOptions::new("sshfs#user@host:/srv").with_opts("allow_other"))
//!     .unwrap();
//!
//! let mountpoint = driver.mount("data", "container-1").unwrap();
//! println!("mounted at {}", mountpoint.display());
//! driver.unmount("data", "container-1").unwrap();
//! ```

mod config;
mod directories;
mod driver;
mod error;
mod options;
mod record;
mod runner;

pub use config::{
    DriverConfig, DATABASE_ENV, DEFAULT_DATABASE, DEFAULT_MOUNT_ROOT, MOUNT_ROOT_ENV,
};
pub use directories::{Directories, LocalDirectories};
pub use driver::Driver;
pub use error::{DriverError, Result};
pub use options::{
    MountOptions, DEFAULT_DRIVER, DEFAULT_MOUNT_COMMAND, DEFAULT_UNMOUNT_COMMAND,
};
pub use record::{VolumeInfo, VolumeRecord};
pub use runner::{CommandRunner, RunError, SystemRunner};

pub use easyfuse_command_template::ParseError;
pub use easyfuse_volume_store::StoreError;
