//! In-memory backend.
//!
//! Keeps files in a map and counts every operation, which makes it the
//! natural backend for exercising write-through behavior without a disk.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::FileSystem;

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, String>,
    dirs: HashSet<PathBuf>,
    writes: Vec<(PathBuf, String)>,
    reads: usize,
    dir_creations: usize,
    fail_writes: bool,
}

/// Filesystem held in memory. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file without counting it as a write.
    pub fn insert_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            add_dir_with_ancestors(&mut state.dirs, parent);
        }
        state.files.insert(path, contents.into());
    }

    /// Current content of `path`, if any.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    /// Every successful write in order, as `(path, contents)`.
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    pub fn dir_creation_count(&self) -> usize {
        self.lock().dir_creations
    }

    /// Total number of reads, writes and directory creations.
    pub fn operation_count(&self) -> usize {
        let state = self.lock();
        state.reads + state.writes.len() + state.dir_creations
    }

    /// Makes subsequent writes and directory creations fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Poisoning is ignored
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn add_dir_with_ancestors(dirs: &mut HashSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        dirs.insert(ancestor.to_path_buf());
    }
}

fn write_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("writes disabled for {}", path.display()),
    )
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return true;
        }
        let state = self.lock();
        state.dirs.contains(path) || state.files.contains_key(path)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(write_denied(path));
        }
        state.dir_creations += 1;
        add_dir_with_ancestors(&mut state.dirs, path);
        Ok(())
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut state = self.lock();
        state.reads += 1;
        state.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(write_denied(path));
        }
        let parent_missing = path
            .parent()
            .map(|p| !p.as_os_str().is_empty() && !state.dirs.contains(p))
            .unwrap_or(false);
        if parent_missing {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent directory missing for {}", path.display()),
            ));
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
        state.writes.push((path.to_path_buf(), contents.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_requires_parent_directory() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/cache/dir/app.json");

        assert!(fs.write(path, "{}").await.is_err());
        fs.create_dir_all(Path::new("/cache/dir")).await.unwrap();
        fs.write(path, "{}").await.unwrap();

        assert_eq!(fs.file(path).as_deref(), Some("{}"));
        assert_eq!(fs.write_count(), 1);
        assert_eq!(fs.dir_creation_count(), 1);
    }

    #[tokio::test]
    async fn test_relative_file_needs_no_directory() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("cache.json"), "{}").await.unwrap();
        assert!(fs.exists(Path::new("cache.json")).await);
    }

    #[tokio::test]
    async fn test_insert_file_is_not_counted() {
        let fs = MemoryFileSystem::new();
        fs.insert_file("/seed/cache.json", "{}");

        assert_eq!(fs.operation_count(), 0);
        assert!(fs.exists(Path::new("/seed")).await);
        assert_eq!(fs.read_to_string(Path::new("/seed/cache.json")).await.unwrap(), "{}");
        assert_eq!(fs.read_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let fs = MemoryFileSystem::new();
        fs.set_fail_writes(true);

        let err = fs.write(Path::new("cache.json"), "{}").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(fs.create_dir_all(Path::new("/x")).await.is_err());
        assert_eq!(fs.write_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let fs = MemoryFileSystem::new();
        let other = fs.clone();
        fs.write(Path::new("a.json"), "1").await.unwrap();
        assert_eq!(other.file("a.json").as_deref(), Some("1"));
    }
}
