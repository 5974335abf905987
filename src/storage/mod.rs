//! Storage Module
//!
//! Filesystem seam used for write-through and hydration. The cache only ever
//! needs four operations, so alternative backends stay small.

mod local;
mod memory;

use std::io;
use std::path::Path;

use async_trait::async_trait;

pub use local::TokioFileSystem;
pub use memory::MemoryFileSystem;

// == File System ==
/// Filesystem operations consumed by the cache.
///
/// Every method is a suspension point; nothing else in the cache awaits.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Returns true if `path` exists. Errors while checking count as absent.
    async fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and every missing parent.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Reads the whole file as UTF-8.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replaces the file content with `contents`.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}
