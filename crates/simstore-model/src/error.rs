//! Schema error types for the object model.

use thiserror::Error;

use crate::address::Address;

/// Errors raised while building, validating or decoding model nodes.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A mapping that should hold a node has no `"type"` key.
    #[error("missing type tag at {at}")]
    MissingTag { at: Address },

    /// The type tag is not one of the variants the field accepts.
    #[error("unknown type tag '{found}' at {at} (expected one of: {expected})")]
    UnknownTag {
        found: String,
        expected: String,
        at: Address,
    },

    /// A declared field is absent.
    #[error("missing field '{field}' for {tag} at {at}")]
    MissingField {
        tag: &'static str,
        field: String,
        at: Address,
    },

    /// A field that the variant does not declare.
    #[error("extra field not permitted: '{field}' for {tag} at {at}")]
    ExtraField {
        tag: &'static str,
        field: String,
        at: Address,
    },

    /// A value of the wrong shape for its field.
    #[error("expected {expected} at {at}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
        at: Address,
    },

    /// A node failed its construction-time validation.
    #[error("invalid {tag} at {at}: {message}")]
    Validation {
        tag: &'static str,
        message: String,
        at: Address,
    },

    /// No reconstruct function is registered for an array kind.
    #[error("unknown array kind: {kind}")]
    UnknownArrayKind { kind: String },

    /// An array kind was registered twice.
    #[error("array kind '{kind}' is already registered")]
    DuplicateArrayKind { kind: String },

    /// An array of one kind was found where another kind is declared.
    #[error("expected {expected} at {at}, found array of kind {found}")]
    ArrayKindMismatch {
        expected: &'static str,
        found: String,
        at: Address,
    },

    /// Dimension names disagree with the array kind.
    #[error("array kind '{kind}' has dims {found:?}, expected {expected:?}")]
    ArrayDims {
        kind: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Cell count does not match the coordinate shape.
    #[error("array kind '{kind}' holds {cells} cells but its coordinates describe {expected}")]
    ArrayShape {
        kind: String,
        cells: usize,
        expected: usize,
    },

    /// The product of the coordinate lengths does not fit in `usize`.
    #[error("array kind '{kind}' has shape {shape:?}, too large to address")]
    ArrayTooLarge { kind: String, shape: Vec<usize> },

    /// An array marker was decoded without a container to resolve it.
    #[error("array marker '{marker}' at {at} has no stored payload")]
    DetachedArray { marker: String, at: Address },

    /// Binary array payload could not be parsed.
    #[error("malformed array payload: {message}")]
    Payload { message: String },

    /// Text could not be parsed as JSON.
    #[error("invalid JSON document")]
    Json(#[from] serde_json::Error),

    /// Text could not be parsed or rendered as YAML.
    #[error("invalid YAML document")]
    Yaml(#[from] serde_yaml::Error),
}

impl ModelError {
    pub(crate) fn mismatch(expected: &'static str, found: &crate::Value, at: &Address) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.type_name().to_string(),
            at: at.clone(),
        }
    }

    pub(crate) fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
