//! File system operations (read, directory listing).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_dir_impl(&self, path: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {:?}", path))?
            .map(|entry| Ok(entry?.path()))
            .collect()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_real_runtime_read_file() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("SLOT");
        std::fs::write(&file_path, "0/1.2\n").unwrap();

        let content = runtime.read_to_string(&file_path).unwrap();
        assert_eq!(content, "0/1.2\n");
        assert!(!runtime.is_dir(&file_path));
    }

    #[test]
    fn test_real_runtime_dir_ops() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let category = dir.path().join("dev-libs");
        std::fs::create_dir_all(category.join("foo-1.0")).unwrap();
        std::fs::write(category.join("stray-file"), "").unwrap();

        assert!(runtime.is_dir(&category));

        let mut entries = runtime.read_dir(&category).unwrap();
        entries.sort();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("foo-1.0"));
        assert!(entries[1].ends_with("stray-file"));
    }

    #[test]
    fn test_real_runtime_errors() {
        let runtime = RealRuntime;

        let result = runtime.read_to_string(Path::new("/nonexistent/path/repository"));
        assert!(result.is_err());

        let result = runtime.read_dir(Path::new("/nonexistent/path"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("/nonexistent/path"));

        assert!(!runtime.is_dir(Path::new("/nonexistent/path")));
    }
}
