//! File I/O — reading and writing a buffer's lines.
//!
//! A file is split on `\n` only, and written back joined with `\n`, so a
//! read followed by a write reproduces the file byte for byte. A file that
//! ends in `\n` reads as a final empty line.
//!
//! Each call opens, uses and closes its own handle.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::FileError;

/// Where the editor loads and saves files.
pub trait FileStore {
    /// The lines of the file at `path`.
    ///
    /// # Errors
    ///
    /// [`FileError::NotFound`] if there is no such file, otherwise
    /// [`FileError::Read`].
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, FileError>;

    /// Replace the file at `path` with `lines` joined by `\n`.
    ///
    /// # Errors
    ///
    /// [`FileError::Write`] if the file cannot be written.
    fn write_lines(&mut self, path: &Path, lines: &[String]) -> Result<(), FileError>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, FileError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FileError::NotFound(path.to_path_buf())
            } else {
                FileError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        log::info!("read {} ({} bytes)", path.display(), text.len());
        Ok(split_lines(&text))
    }

    fn write_lines(&mut self, path: &Path, lines: &[String]) -> Result<(), FileError> {
        let text = lines.join("\n");
        fs::write(path, &text).map_err(|source| FileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("wrote {} ({} bytes)", path.display(), text.len());
        Ok(())
    }
}

/// Split `text` on `\n`. Always at least one line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// An in-memory store that records every write.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub files: std::collections::HashMap<std::path::PathBuf, String>,
    pub writes: Vec<(std::path::PathBuf, String)>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_file(path: &str, text: &str) -> Self {
        let mut store = Self::default();
        store.files.insert(path.into(), text.to_string());
        store
    }
}

#[cfg(test)]
impl FileStore for MemoryStore {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, FileError> {
        self.files
            .get(path)
            .map(|text| split_lines(text))
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    fn write_lines(&mut self, path: &Path, lines: &[String]) -> Result<(), FileError> {
        if self.fail_writes {
            return Err(FileError::Write {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        let text = lines.join("\n");
        self.writes.push((path.to_path_buf(), text.clone()));
        self.files.insert(path.to_path_buf(), text);
        Ok(())
    }
}
