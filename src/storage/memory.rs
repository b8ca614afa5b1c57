use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
};

use super::Storage;
use crate::error::Result;

/// [`Storage`] kept entirely in memory. Writes fail unless the parent
/// directory was created with [`Storage::ensure_dir`], like on a real
/// filesystem. The current directory (empty parent) always exists.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, creating its parent directories.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.files.borrow_mut().insert(path, contents.into());
        self
    }

    /// Every file path currently stored, in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    fn insert_dirs(&self, path: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn has_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.borrow().contains(path)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        Ok(self.contents(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent = path.parent().unwrap_or(Path::new(""));
        if !self.has_dir(parent) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", parent.display()),
            )
            .into());
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.borrow().contains_key(path) || self.dirs.borrow().contains(path))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if self.files.borrow().contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            )
            .into());
        }
        self.insert_dirs(path);
        Ok(())
    }
}
