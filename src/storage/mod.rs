#[cfg(test)]
use mockall::automock;

use std::path::Path;

use crate::error::Result;

mod local;
pub use local::LocalStorage;

mod memory;
pub use memory::MemoryStorage;

/// The file operations the analyzer needs, so the pipeline can run against
/// the real filesystem or an in-memory fake.
#[cfg_attr(test, automock)]
pub trait Storage {
    /// Returns the file's contents, or `None` if there is no file at `path`.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Creates or truncates the file at `path`.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> Result<bool>;

    /// Creates `path` and any missing parents. A no-op if it already exists.
    fn ensure_dir(&self, path: &Path) -> Result<()>;
}
