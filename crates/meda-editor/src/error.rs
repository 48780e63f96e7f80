//! Error types for the editor core.
//!
//! | Error          | Meaning                                   | Handling                     |
//! |----------------|-------------------------------------------|------------------------------|
//! | [`BufferError`] | a coordinate fell outside the buffer     | internal defect, never shown |
//! | [`FileError`]   | reading or writing a file failed         | not-found → empty buffer; write → status message |
//! | [`ConfigError`] | the config file could not be read/parsed | startup error                |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// An index outside the line buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("line {line} out of range (buffer has {len} lines)")]
    LineOutOfRange { line: usize, len: usize },

    #[error("column {col} out of range on line {line} (length {len})")]
    ColumnOutOfRange { line: usize, col: usize, len: usize },

    #[error("the first line has no previous line to join with")]
    NoPreviousLine,
}

/// A failed file operation.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A config file that exists but could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type BufferResult<T> = std::result::Result<T, BufferError>;
