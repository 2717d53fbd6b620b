//! The volume driver: create, remove, mount and unmount named volumes.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use easyfuse_volume_store::JsonFileStore;

use crate::{
    CommandRunner, Directories, DriverConfig, DriverError, LocalDirectories, MountOptions,
    Result, SystemRunner, VolumeInfo, VolumeRecord,
};

lazy_static! {
    static ref VOLUME_NAME: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").unwrap();
}

/// Manages volumes shared by any number of mounting instances.
///
/// A volume is mounted when its first instance mounts it and unmounted when
/// its last instance leaves. Every operation runs in one store transaction,
/// command execution included, so operations are serialized across all
/// volumes.
pub struct Driver {
    mount_root: PathBuf,
    store: JsonFileStore<VolumeRecord>,
    runner: Box<dyn CommandRunner>,
    directories: Box<dyn Directories>,
}

impl Driver {
    /// A driver running real commands on the local filesystem.
    pub fn new(config: DriverConfig) -> Result<Self> {
        Self::with_collaborators(config, Box::new(SystemRunner), Box::new(LocalDirectories))
    }

    /// A driver using the given command runner and directory manager.
    ///
    /// Creates the mount root and the database's parent directory.
    pub fn with_collaborators(
        config: DriverConfig,
        runner: Box<dyn CommandRunner>,
        directories: Box<dyn Directories>,
    ) -> Result<Self> {
        ensure_dir(directories.as_ref(), &config.mount_root)?;
        if let Some(parent) = config
            .database
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            ensure_dir(directories.as_ref(), parent)?;
        }

        Ok(Self {
            mount_root: config.mount_root,
            store: JsonFileStore::new(config.database),
            runner,
            directories,
        })
    }

    /// The mount point of volume `name`, whether or not it exists.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.mount_root.join(name)
    }

    pub fn create(&self, name: &str, options: MountOptions) -> Result<()> {
        if !VOLUME_NAME.is_match(name) {
            return Err(DriverError::InvalidName {
                name: name.to_string(),
            });
        }
        options.validate()?;

        self.store.transaction(|tx| -> Result<()> {
            if tx.contains(name) {
                return Err(DriverError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            tx.set(name, VolumeRecord::new(name, options));
            log::info!("Created volume {}", name);
            Ok(())
        })
    }

    /// Delete a volume. A mounted volume is removed without being unmounted.
    pub fn remove(&self, name: &str) -> Result<()> {
        self.store.transaction(|tx| -> Result<()> {
            if !tx.contains(name) {
                return Err(DriverError::NotFound {
                    name: name.to_string(),
                });
            }
            // An unreadable record is still removed.
            let mounted = match tx.peek(name) {
                Ok(record) => record.is_mounted,
                Err(error) => {
                    log::warn!("Volume {} has an unreadable record: {}", name, error);
                    false
                }
            };
            tx.delete(name)?;
            if mounted {
                log::warn!(
                    "Removed volume {} while still mounted at {}",
                    name,
                    self.path_for(name).display()
                );
            } else {
                log::info!("Removed volume {}", name);
            }
            Ok(())
        })
    }

    /// Register `instance` as a holder of the volume, mounting it if needed.
    ///
    /// Returns the mount point. If the mount command fails, the instance
    /// stays registered and the volume stays unmounted, so calling again
    /// retries the command.
    pub fn mount(&self, name: &str, instance: &str) -> Result<PathBuf> {
        let target = self.path_for(name);

        self.store.transaction(|tx| -> Result<()> {
            let volume = tx.get_mut(name)?;
            if volume.instances.insert(instance.to_string()) {
                log::info!("Instance {} holds volume {}", instance, name);
            }
            if volume.is_mounted {
                return Ok(());
            }

            let argv = volume.options.mount_argv(&target)?;
            ensure_dir(self.directories.as_ref(), &target)?;
            self.execute(argv)?;
            volume.is_mounted = true;
            log::info!("Mounted volume {} at {}", name, target.display());
            Ok(())
        })?;

        Ok(target)
    }

    /// Release `instance`'s hold on the volume, unmounting it if it was the
    /// last holder.
    ///
    /// If the unmount command fails, the instance stays released and the
    /// volume stays mounted. The next holder to arrive reuses the existing
    /// mount, and the command is retried when that holder leaves.
    pub fn unmount(&self, name: &str, instance: &str) -> Result<()> {
        self.store.transaction(|tx| -> Result<()> {
            let volume = tx.get_mut(name)?;
            if !volume.instances.remove(instance) {
                return Err(DriverError::InstanceNotFound {
                    name: name.to_string(),
                    instance: instance.to_string(),
                });
            }
            log::info!("Instance {} released volume {}", instance, name);
            if !volume.instances.is_empty() || !volume.is_mounted {
                return Ok(());
            }

            let target = self.path_for(name);
            let argv = volume.options.unmount_argv(&target)?;
            self.execute(argv)?;
            volume.is_mounted = false;
            log::info!("Unmounted volume {} from {}", name, target.display());

            if let Err(error) = self.directories.remove_empty(&target) {
                log::warn!(
                    "Failed to remove mount point {}: {}",
                    target.display(),
                    error
                );
            }
            Ok(())
        })
    }

    pub fn is_mounted(&self, name: &str) -> Result<bool> {
        self.store
            .transaction(|tx| -> Result<bool> { Ok(tx.peek(name)?.is_mounted) })
    }

    /// A snapshot of the volume's record.
    pub fn get(&self, name: &str) -> Result<VolumeRecord> {
        self.store
            .transaction(|tx| -> Result<VolumeRecord> { Ok(tx.peek(name)?.into_owned()) })
    }

    /// All volumes, ordered by name.
    pub fn list_volumes(&self) -> Result<Vec<VolumeInfo>> {
        self.store.transaction(|tx| -> Result<Vec<VolumeInfo>> {
            tx.keys()
                .into_iter()
                .map(|name| -> Result<VolumeInfo> {
                    let record = tx.peek(&name)?;
                    Ok(VolumeInfo {
                        mountpoint: self.path_for(&name),
                        mounted: record.is_mounted,
                        name,
                    })
                })
                .collect()
        })
    }

    fn execute(&self, argv: Vec<String>) -> Result<()> {
        log::info!("Running {:?}", argv);
        self.runner
            .run(&argv)
            .map_err(|source| DriverError::ProcessExecution { argv, source })
    }
}

fn ensure_dir(directories: &dyn Directories, path: &Path) -> Result<()> {
    directories
        .ensure(path)
        .map_err(|source| DriverError::Directory {
            path: path.to_path_buf(),
            source,
        })
}
