//! Per-volume mount options.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use easyfuse_command_template::CommandTemplate;

use crate::{DriverError, Result};

pub const DEFAULT_DRIVER: &str = "fuse";
pub const DEFAULT_MOUNT_COMMAND: &str = "mount -t {driver} [-o {opts}] {device} {target}";
pub const DEFAULT_UNMOUNT_COMMAND: &str = "umount {target}";

const KNOWN_OPTIONS: &[&str] = &[
    "device",
    "o",
    "opts",
    "driver",
    "mount_command",
    "unmount_command",
];

/// How a volume is mounted, fixed when the volume is created.
///
/// The mount and unmount commands are templates (see
/// [`easyfuse_command_template`]) over four variables: `device`, `opts`,
/// `driver` and `target`, the last being the volume's mount point.
///
/// Only `device` is required. Missing fields in stored records fall back to
/// their defaults, and `o` is accepted for `opts`. A stored record without a
/// device still decodes, but cannot be mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountOptions {
    #[serde(default)]
    device: String,
    #[serde(default, alias = "o")]
    opts: String,
    #[serde(default = "default_driver")]
    driver: String,
    #[serde(default = "default_mount_command")]
    mount_command: String,
    #[serde(default = "default_unmount_command")]
    unmount_command: String,
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_mount_command() -> String {
    DEFAULT_MOUNT_COMMAND.to_string()
}

fn default_unmount_command() -> String {
    DEFAULT_UNMOUNT_COMMAND.to_string()
}

impl MountOptions {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            opts: String::new(),
            driver: default_driver(),
            mount_command: default_mount_command(),
            unmount_command: default_unmount_command(),
        }
    }

    pub fn with_opts(mut self, opts: impl Into<String>) -> Self {
        self.opts = opts.into();
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_mount_command(mut self, template: impl Into<String>) -> Self {
        self.mount_command = template.into();
        self
    }

    pub fn with_unmount_command(mut self, template: impl Into<String>) -> Self {
        self.unmount_command = template.into();
        self
    }

    /// Build options from the free-form key/value map a plugin client sends
    /// on volume creation.
    ///
    /// Unknown keys are logged and ignored. The result is validated.
    pub fn from_driver_opts(opts: &HashMap<String, String>) -> Result<Self> {
        for key in opts.keys() {
            if !KNOWN_OPTIONS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown volume option {:?}", key);
            }
        }

        let device = opts.get("device").ok_or_else(|| DriverError::MissingOption {
            option: "device".to_string(),
        })?;
        let mut options = Self::new(device.as_str());

        if let Some(value) = opts.get("o").or_else(|| opts.get("opts")) {
            options.opts = value.clone();
        }
        if let Some(value) = opts.get("driver") {
            options.driver = value.clone();
        }
        if let Some(value) = opts.get("mount_command") {
            options.mount_command = value.clone();
        }
        if let Some(value) = opts.get("unmount_command") {
            options.unmount_command = value.clone();
        }

        options.validate()?;
        Ok(options)
    }

    /// Check that a device is set and that both command templates parse.
    pub fn validate(&self) -> Result<()> {
        self.require_device()?;
        CommandTemplate::parse(&self.mount_command)?;
        CommandTemplate::parse(&self.unmount_command)?;
        Ok(())
    }

    fn require_device(&self) -> Result<()> {
        if self.device.is_empty() {
            return Err(DriverError::MissingOption {
                option: "device".to_string(),
            });
        }
        Ok(())
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn opts(&self) -> &str {
        &self.opts
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn mount_command(&self) -> &str {
        &self.mount_command
    }

    pub fn unmount_command(&self) -> &str {
        &self.unmount_command
    }

    /// Fails with [`DriverError::MissingOption`] if no device is set.
    pub fn mount_argv(&self, target: &Path) -> Result<Vec<String>> {
        self.require_device()?;
        self.argv(&self.mount_command, target)
    }

    pub fn unmount_argv(&self, target: &Path) -> Result<Vec<String>> {
        self.argv(&self.unmount_command, target)
    }

    fn argv(&self, template: &str, target: &Path) -> Result<Vec<String>> {
        let template = CommandTemplate::parse(template)?;
        Ok(template.expand(&self.variables(target)))
    }

    fn variables(&self, target: &Path) -> HashMap<&'static str, String> {
        HashMap::from([
            ("device", self.device.clone()),
            ("opts", self.opts.clone()),
            ("driver", self.driver.clone()),
            ("target", target.to_string_lossy().into_owned()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easyfuse_command_template::ParseError;

    fn opts(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let options = MountOptions::new("sshfs#user@host:/");
        assert_eq!(options.device(), "sshfs#user@host:/");
        assert_eq!(options.opts(), "");
        assert_eq!(options.driver(), "fuse");
        assert_eq!(options.mount_command(), DEFAULT_MOUNT_COMMAND);
        assert_eq!(options.unmount_command(), DEFAULT_UNMOUNT_COMMAND);
    }

    #[test]
    fn default_argv() {
        let target = Path::new("/mnt/v");
        let options = MountOptions::new("/dev/x");
        assert_eq!(
            options.mount_argv(target).unwrap(),
            vec!["mount", "-t", "fuse", "/dev/x", "/mnt/v"]
        );
        assert_eq!(options.unmount_argv(target).unwrap(), vec!["umount", "/mnt/v"]);

        let options = options.with_opts("allow_other");
        assert_eq!(
            options.mount_argv(target).unwrap(),
            vec!["mount", "-t", "fuse", "-o", "allow_other", "/dev/x", "/mnt/v"]
        );
    }

    #[test]
    fn custom_templates() {
        let options = MountOptions::new("host:/export")
            .with_driver("sshfs")
            .with_opts("ro\nallow_other")
            .with_mount_command("{driver} {device} {target} [-o {opts}]")
            .with_unmount_command("fusermount -u {target}");
        let target = Path::new("/mnt/data");
        assert_eq!(
            options.mount_argv(target).unwrap(),
            vec![
                "sshfs",
                "host:/export",
                "/mnt/data",
                "-o",
                "ro",
                "-o",
                "allow_other"
            ]
        );
        assert_eq!(
            options.unmount_argv(target).unwrap(),
            vec!["fusermount", "-u", "/mnt/data"]
        );
    }

    #[test]
    fn from_driver_opts_requires_device() {
        let e = MountOptions::from_driver_opts(&opts(&[("o", "ro")])).unwrap_err();
        assert!(matches!(e, DriverError::MissingOption { ref option } if option == "device"));

        let e = MountOptions::from_driver_opts(&opts(&[("device", "")])).unwrap_err();
        assert!(matches!(e, DriverError::MissingOption { .. }));
    }

    #[test]
    fn from_driver_opts_reads_all_keys() {
        let options = MountOptions::from_driver_opts(&opts(&[
            ("device", "bucket"),
            ("o", "ro"),
            ("driver", "s3fs"),
            ("mount_command", "{driver} {device} {target} [-o {opts}]"),
            ("unmount_command", "fusermount -u {target}"),
            ("color", "blue"),
        ]))
        .unwrap();
        assert_eq!(
            options,
            MountOptions::new("bucket")
                .with_opts("ro")
                .with_driver("s3fs")
                .with_mount_command("{driver} {device} {target} [-o {opts}]")
                .with_unmount_command("fusermount -u {target}")
        );
    }

    #[test]
    fn from_driver_opts_accepts_long_opts_key() {
        let options =
            MountOptions::from_driver_opts(&opts(&[("device", "d"), ("opts", "rw")])).unwrap();
        assert_eq!(options.opts(), "rw");
    }

    #[test]
    fn from_driver_opts_rejects_bad_template() {
        let e = MountOptions::from_driver_opts(&opts(&[
            ("device", "d"),
            ("mount_command", "mount [-o {opts} {device}"),
        ]))
        .unwrap_err();
        assert!(matches!(
            e,
            DriverError::Parse(ParseError::UnterminatedBracket)
        ));
    }

    #[test]
    fn persisted_layout() {
        let value = serde_json::to_value(MountOptions::new("d")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "device": "d",
                "opts": "",
                "driver": "fuse",
                "mount_command": DEFAULT_MOUNT_COMMAND,
                "unmount_command": DEFAULT_UNMOUNT_COMMAND,
            })
        );
    }

    #[test]
    fn decodes_short_form() {
        let options: MountOptions =
            serde_json::from_value(serde_json::json!({"device": "d", "o": "ro"})).unwrap();
        assert_eq!(options, MountOptions::new("d").with_opts("ro"));
    }

    #[test]
    fn stored_options_without_device() {
        let options: MountOptions =
            serde_json::from_value(serde_json::json!({"o": "ro"})).unwrap();
        assert_eq!(options.device(), "");

        let target = Path::new("/mnt/v");
        let e = options.mount_argv(target).unwrap_err();
        assert!(matches!(e, DriverError::MissingOption { ref option } if option == "device"));
        assert_eq!(options.unmount_argv(target).unwrap(), vec!["umount", "/mnt/v"]);
    }
}
