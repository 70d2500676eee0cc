//! Storage error types.
//!
//! Every storage operation returns a [`StoreError`]; [`StoreError::kind`]
//! sorts it into one of the broad [`ErrorKind`] classes and
//! [`StoreError::suggestion`] offers a remediation hint where one exists.

use std::path::PathBuf;

use simstore_model::{Address, ModelError};
use thiserror::Error;

/// Broad class of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsupported or unreadable file.
    File,
    /// Content does not match the model schema.
    Schema,
    /// A requested address does not exist.
    Lookup,
    /// Container entries disagree with the embedded document.
    Integrity,
    /// Operating system I/O failure.
    Io,
}

/// Storage operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File extension is not one of the supported formats.
    #[error("unsupported file extension: {path} (expected .json, .yaml, .hdf5 or .hdf5.gz)")]
    UnsupportedExtension { path: PathBuf },

    /// Content does not satisfy the model schema.
    #[error(transparent)]
    Schema(#[from] ModelError),

    /// Requested address is not present in the document.
    #[error("address {address} not found in {path}: {reason}")]
    AddressNotFound {
        address: Address,
        path: PathBuf,
        reason: String,
    },

    /// File I/O error.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a container file, or a damaged one.
    #[error("invalid container {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// Container written by a newer format version.
    #[error("container version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// A marker has no entry at its address.
    #[error("no entry for array marker at {address} in {path}")]
    MissingEntry { address: String, path: PathBuf },

    /// An array entry is not referenced by any marker.
    #[error("entry {address} in {path} is not referenced by any array marker")]
    OrphanEntry { address: String, path: PathBuf },

    /// An entry's payload does not match the marker that references it.
    #[error("entry {address} in {path} does not match its marker (expected {expected}, found {found})")]
    DigestMismatch {
        address: String,
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Two entries were written under one key.
    #[error("duplicate entry {address} in {path}")]
    DuplicateEntry { address: String, path: PathBuf },

    /// A mapping key cannot be used as an address segment.
    #[error("invalid key '{key}' at {address}: keys must be non-empty and must not contain '/'")]
    InvalidKey { key: String, address: Address },

    /// A string field holds text that would be read back as an array marker.
    #[error("string at {address} looks like an array marker ('{text}') and cannot be stored in a container")]
    MarkerText { text: String, address: Address },

    /// Text is not valid JSON.
    #[error("failed to parse JSON document: {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Text is not valid YAML, or a value could not be rendered as YAML.
    #[error("failed to process YAML document: {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Gzip stream could not be encoded or decoded.
    #[error("failed to {operation}: {path}")]
    Compression {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A background task panicked or was cancelled.
    #[cfg(feature = "async")]
    #[error("background storage task failed")]
    Background {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedExtension { .. }
            | Self::InvalidFormat { .. }
            | Self::UnsupportedVersion { .. }
            | Self::Json { .. }
            | Self::Yaml { .. }
            | Self::Compression { .. } => ErrorKind::File,
            // Only stored entries reach these; in-memory arrays cannot be built with them.
            Self::Schema(ModelError::Payload { .. } | ModelError::ArrayTooLarge { .. }) => {
                ErrorKind::Integrity
            }
            Self::Schema(_) | Self::InvalidKey { .. } | Self::MarkerText { .. } => ErrorKind::Schema,
            Self::AddressNotFound { .. } => ErrorKind::Lookup,
            Self::MissingEntry { .. }
            | Self::OrphanEntry { .. }
            | Self::DigestMismatch { .. }
            | Self::DuplicateEntry { .. } => ErrorKind::Integrity,
            Self::Io { .. } => ErrorKind::Io,
            #[cfg(feature = "async")]
            Self::Background { .. } => ErrorKind::Io,
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedExtension { .. } => {
                Some("Use a path ending in .json, .yaml, .hdf5 or .hdf5.gz.".into())
            }
            Self::Schema(ModelError::UnknownArrayKind { .. }) => Some(
                "Register the array kind with an ArrayRegistry and install it before loading."
                    .into(),
            ),
            Self::Schema(ModelError::DetachedArray { .. }) => Some(
                "Text formats do not store array data; save to .hdf5 or .hdf5.gz instead.".into(),
            ),
            Self::Schema(ModelError::Payload { .. } | ModelError::ArrayTooLarge { .. }) => {
                Some("The container was modified outside simstore; re-save it from the source model.".into())
            }
            Self::Schema(_) => None,
            Self::AddressNotFound { .. } => {
                Some("Run `simstore inspect` on the file to list valid addresses.".into())
            }
            Self::Io { operation, .. } => {
                if *operation == "read" || *operation == "open" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::InvalidFormat { .. } | Self::Compression { .. } => {
                Some("The file may be truncated or corrupted; try an earlier copy.".into())
            }
            Self::UnsupportedVersion { .. } => {
                Some("Upgrade simstore to a version that reads this container.".into())
            }
            Self::MissingEntry { .. }
            | Self::OrphanEntry { .. }
            | Self::DigestMismatch { .. }
            | Self::DuplicateEntry { .. } => {
                Some("The container was modified outside simstore; re-save it from the source model.".into())
            }
            Self::InvalidKey { .. } => Some("Rename the key so it has no '/' characters.".into()),
            Self::MarkerText { .. } => {
                Some("Store the array itself, or change the text so it does not look like an array marker.".into())
            }
            Self::Json { .. } | Self::Yaml { .. } => None,
            #[cfg(feature = "async")]
            Self::Background { .. } => None,
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
