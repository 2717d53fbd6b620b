//! Mount point directory management.

use std::fs;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

pub trait Directories: Send + Sync {
    /// Create `path` and any missing parents. Existing directories are fine.
    fn ensure(&self, path: &Path) -> io::Result<()>;

    /// Remove `path` if it is an empty directory. A missing path is fine.
    fn remove_empty(&self, path: &Path) -> io::Result<()>;
}

/// Directories on the local filesystem, created world-writable (subject to
/// the process umask).
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalDirectories;

impl Directories for LocalDirectories {
    fn ensure(&self, path: &Path) -> io::Result<()> {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o777)
            .create(path)
    }

    fn remove_empty(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir(path) {
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_recursive_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c");
        LocalDirectories.ensure(&path).unwrap();
        LocalDirectories.ensure(&path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn remove_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v");
        LocalDirectories.ensure(&path).unwrap();
        LocalDirectories.remove_empty(&path).unwrap();
        assert!(!path.exists());
        LocalDirectories.remove_empty(&path).unwrap();
    }

    #[test]
    fn refuses_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v");
        LocalDirectories.ensure(&path).unwrap();
        fs::write(path.join("file"), b"data").unwrap();
        assert!(LocalDirectories.remove_empty(&path).is_err());
        assert!(path.is_dir());
    }
}
