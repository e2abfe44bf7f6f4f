//! Atomic file operations for safe checkpoint data handling

use super::{CheckpointError, CheckpointResult};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Permissions applied to every checkpoint artifact before it becomes visible
#[cfg(unix)]
pub const FILE_MODE: u32 = 0o644;

/// Atomic file writer that uses the write-temp-rename pattern.
///
/// The temporary file lives in the destination's directory so the final
/// rename never crosses a filesystem boundary. Until [`commit`] succeeds the
/// destination keeps its previous contents (or stays absent); the temporary
/// file is removed on drop.
///
/// [`commit`]: AtomicFileWriter::commit
pub struct AtomicFileWriter {
    target_path: PathBuf,
    temp_path: PathBuf,
}

impl AtomicFileWriter {
    /// Create a new atomic file writer for the target path
    pub fn new(target_path: &Path) -> CheckpointResult<Self> {
        let temp_path = Self::generate_temp_path(target_path)?;

        Ok(AtomicFileWriter {
            target_path: target_path.to_path_buf(),
            temp_path,
        })
    }

    /// Path of the temporary file used while writing
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Fill the temporary file with `fill`, then commit it over the target.
    pub fn write_with<F>(&self, fill: F) -> CheckpointResult<()>
    where
        F: FnOnce(&mut File) -> std::io::Result<()>,
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.temp_path)
            .map_err(|e| {
                CheckpointError::storage(format!(
                    "creating temp file {}: {}",
                    self.temp_path.display(),
                    e
                ))
            })?;

        fill(&mut file).map_err(|e| {
            CheckpointError::storage(format!(
                "writing temp file {}: {}",
                self.temp_path.display(),
                e
            ))
        })?;
        file.sync_all().map_err(|e| {
            CheckpointError::storage(format!(
                "syncing temp file {}: {}",
                self.temp_path.display(),
                e
            ))
        })?;
        drop(file);

        self.set_permissions()?;
        self.commit()
    }

    /// Write raw bytes to the file atomically
    pub fn write_bytes(&self, data: &[u8]) -> CheckpointResult<()> {
        self.write_with(|file| file.write_all(data))
    }

    /// Write content to the file atomically
    pub fn write_content(&self, content: &str) -> CheckpointResult<()> {
        self.write_bytes(content.as_bytes())
    }

    /// Write JSON data to the file atomically
    pub fn write_json<T: serde::Serialize>(&self, data: &T) -> CheckpointResult<()> {
        let content = serde_json::to_string_pretty(data)?;
        self.write_content(&content)
    }

    /// Commit the write by renaming temp file to target
    pub fn commit(&self) -> CheckpointResult<()> {
        fs::rename(&self.temp_path, &self.target_path).map_err(|e| {
            CheckpointError::atomic(format!(
                "renaming {} to {}: {}",
                self.temp_path.display(),
                self.target_path.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Abort the write by deleting the temp file
    pub fn abort(&self) -> CheckpointResult<()> {
        if self.temp_path.exists() {
            fs::remove_file(&self.temp_path)?;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn set_permissions(&self) -> CheckpointResult<()> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(&self.temp_path, fs::Permissions::from_mode(FILE_MODE)).map_err(
            |e| {
                CheckpointError::storage(format!(
                    "chmod temp file {}: {}",
                    self.temp_path.display(),
                    e
                ))
            },
        )
    }

    #[cfg(not(unix))]
    fn set_permissions(&self) -> CheckpointResult<()> {
        Ok(())
    }

    /// Generate a unique temporary file path next to the target
    fn generate_temp_path(target: &Path) -> CheckpointResult<PathBuf> {
        let parent = target.parent().ok_or_else(|| {
            CheckpointError::storage("Target path has no parent directory".to_string())
        })?;

        let filename = target
            .file_name()
            .ok_or_else(|| CheckpointError::storage("Target path has no filename".to_string()))?;

        let temp_name = format!(
            ".{}.tmp.{}",
            filename.to_string_lossy(),
            Uuid::new_v4().simple()
        );

        Ok(parent.join(temp_name))
    }
}

impl Drop for AtomicFileWriter {
    fn drop(&mut self) {
        // Clean up temp file if it still exists
        let _ = self.abort();
    }
}

/// Atomic file operations utility functions
pub struct AtomicOps;

impl AtomicOps {
    /// Atomically write string content to a file
    pub fn write_file(path: &Path, content: &str) -> CheckpointResult<()> {
        let writer = AtomicFileWriter::new(path)?;
        writer.write_content(content)
    }

    /// Atomically write JSON data to a file
    pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> CheckpointResult<()> {
        let writer = AtomicFileWriter::new(path)?;
        writer.write_json(data)
    }

    /// Read JSON data from a file
    pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CheckpointResult<T> {
        let content = fs::read_to_string(path)?;
        let data = serde_json::from_str(&content)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_atomic_write_success() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("test.json");

        let data = serde_json::json!({"test": "data"});
        AtomicOps::write_json(&target_path, &data).unwrap();

        assert!(target_path.exists());
        let read_data: serde_json::Value = AtomicOps::read_json(&target_path).unwrap();
        assert_eq!(data, read_data);
        assert_eq!(dir_entries(temp_dir.path()), vec!["test.json".to_string()]);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("status.txt");

        AtomicOps::write_file(&target_path, "first").unwrap();
        AtomicOps::write_file(&target_path, "second").unwrap();

        assert_eq!(fs::read_to_string(&target_path).unwrap(), "second");
    }

    #[test]
    fn test_failed_temp_write_keeps_previous_contents() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("metadata.json");
        fs::write(&target_path, "original").unwrap();

        let writer = AtomicFileWriter::new(&target_path).unwrap();
        let result = writer.write_with(|file| {
            file.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });
        assert!(result.is_err());
        drop(writer);

        assert_eq!(fs::read_to_string(&target_path).unwrap(), "original");
        assert_eq!(dir_entries(temp_dir.path()), vec!["metadata.json".to_string()]);
    }

    #[test]
    fn test_failed_temp_write_leaves_target_absent() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("session.json");

        {
            let writer = AtomicFileWriter::new(&target_path).unwrap();
            let result = writer.write_with(|_| Err(io::Error::new(io::ErrorKind::Other, "boom")));
            assert!(result.is_err());
        }

        assert!(!target_path.exists());
        assert!(dir_entries(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("missing").join("metadata.json");

        let result = AtomicOps::write_file(&target_path, "data");
        assert!(matches!(result, Err(CheckpointError::Storage { .. })));
        assert!(!target_path.exists());
    }

    #[test]
    fn test_temp_file_is_in_target_directory() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("git.patch");

        let writer = AtomicFileWriter::new(&target_path).unwrap();
        assert_eq!(writer.temp_path().parent(), target_path.parent());
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_not_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("pane_0.txt");
        AtomicOps::write_file(&target_path, "scrollback").unwrap();

        let mode = fs::metadata(&target_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, FILE_MODE);
    }
}
