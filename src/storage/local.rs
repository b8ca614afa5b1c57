use std::{fs, io, path::Path};

use super::Storage;
use crate::error::Result;

/// [`Storage`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        Ok(fs::write(path, contents)?)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.try_exists()?)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path)?)
    }
}
