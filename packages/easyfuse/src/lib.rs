//! easyfuse: named volumes backed by arbitrary mount commands.
//!
//! The pieces, leaves first:
//! - [`template`]: command templates expanded into argv lists
//! - [`store`]: the transactional JSON record store
//! - [`driver`]: reference-counted mounting on top of both

pub use easyfuse_command_template as template;
pub use easyfuse_driver as driver;
pub use easyfuse_volume_store as store;

pub use easyfuse_driver::{
    Driver, DriverConfig, DriverError, MountOptions, VolumeInfo, VolumeRecord,
};
