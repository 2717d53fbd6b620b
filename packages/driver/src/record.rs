//! Volume records as kept in the mount database.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::MountOptions;

/// The persisted state of one volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub name: String,
    /// Callers currently holding the volume mounted.
    #[serde(default)]
    pub instances: BTreeSet<String>,
    #[serde(rename = "opts")]
    pub options: MountOptions,
    /// Set only after a successful mount command, cleared only after a
    /// successful unmount command.
    #[serde(default)]
    pub is_mounted: bool,
}

impl VolumeRecord {
    pub fn new(name: impl Into<String>, options: MountOptions) -> Self {
        Self {
            name: name.into(),
            instances: BTreeSet::new(),
            options,
            is_mounted: false,
        }
    }
}

/// A volume as reported to plugin clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeInfo {
    pub name: String,
    pub mountpoint: PathBuf,
    pub mounted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_record_is_idle() {
        let record = VolumeRecord::new("v", MountOptions::new("d"));
        assert!(record.instances.is_empty());
        assert!(!record.is_mounted);
    }

    #[test]
    fn persisted_layout() {
        let mut record = VolumeRecord::new("v", MountOptions::new("d"));
        record.instances.insert("b".to_string());
        record.instances.insert("a".to_string());
        record.is_mounted = true;

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], json!("v"));
        assert_eq!(value["instances"], json!(["a", "b"]));
        assert_eq!(value["opts"]["device"], json!("d"));
        assert_eq!(value["is_mounted"], json!(true));
    }

    #[test]
    fn decodes_minimal_legacy_record() {
        let record: VolumeRecord = serde_json::from_value(json!({
            "name": "v",
            "instances": ["x"],
            "opts": {"device": "sshfs#host:/", "o": "allow_other"},
            "is_mounted": false,
        }))
        .unwrap();
        assert_eq!(record.options.opts(), "allow_other");
        assert_eq!(record.options.driver(), "fuse");
        assert!(record.instances.contains("x"));
    }
}
