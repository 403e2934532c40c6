// Data directory layout

use std::io;
use std::path::{Path, PathBuf};

const PROFILES_DIR: &str = "profiles";

/// `<root>/profiles/<artifact name>`
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join(PROFILES_DIR)
    }

    /// Create the root and profiles directories if missing
    pub fn create(&self) -> io::Result<()> {
        ensure_dir(&self.root)?;
        ensure_dir(&self.profiles_dir())
    }
}

/// `mkdir -p` with owner+group-only permissions on unix
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path().join(".pprofit"));

        layout.create().unwrap();
        layout.create().unwrap();

        assert!(layout.profiles_dir().is_dir());
        assert_eq!(layout.profiles_dir(), tmp.path().join(".pprofit/profiles"));
    }

    #[test]
    fn test_create_fails_when_root_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("occupied");
        std::fs::write(&root, b"not a directory").unwrap();

        assert!(DataLayout::new(root).create().is_err());
    }
}
