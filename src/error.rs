//! Error types for pagesplit library.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pagesplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while splitting or chatting.
#[derive(Error, Debug)]
pub enum Error {
    /// The source document does not exist.
    #[error("Source document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The source exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output file or directory could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    Parse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A single-page document could not be serialized.
    #[error("Failed to serialize page {page}: {message}")]
    Serialize { page: u32, message: String },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Required configuration values are missing.
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    /// A configuration value is present but unusable.
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    /// Transport failure talking to the chat endpoint.
    #[cfg(feature = "chat")]
    #[error("Chat request failed: {0}")]
    ChatRequest(#[from] reqwest::Error),

    /// The chat endpoint answered with a non-success status.
    #[error("Chat API error ({status}): {message}")]
    ChatApi { status: u16, message: String },

    /// The chat endpoint returned no message content.
    #[error("Chat API returned an empty response")]
    EmptyResponse,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing input.
    NotFound,
    /// Malformed or unsupported container.
    Parse,
    /// Destination unwritable.
    Write,
    /// Missing or invalid configuration.
    Config,
    /// Chat endpoint failure.
    Chat,
    /// Anything else.
    Other,
}

impl Error {
    /// Build a write error for `path`.
    pub fn write(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Write {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a read error for `path`.
    pub fn read(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Read {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::Parse(_)
            | Error::Encrypted => ErrorKind::Parse,
            Error::Write { .. } | Error::Serialize { .. } => ErrorKind::Write,
            Error::MissingConfig(_) | Error::InvalidConfig { .. } => ErrorKind::Config,
            #[cfg(feature = "chat")]
            Error::ChatRequest(_) => ErrorKind::Chat,
            Error::ChatApi { .. } | Error::EmptyResponse => ErrorKind::Chat,
            Error::Read { .. }
            | Error::Io(_)
            | Error::PageOutOfRange(..)
            | Error::InvalidPageRange(_)
            | Error::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Parse(err.to_string()),
        }
    }
}
