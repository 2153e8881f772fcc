//! Error types for Glyphseal Core.

use std::fmt;

use thiserror::Error;

use crate::value::NodeId;

/// Errors from value-graph construction and wire encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown node handle: {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not an array")]
    NotAnArray(NodeId),

    #[error("node {0} is not an object")]
    NotAnObject(NodeId),

    #[error("duplicate object key: {0:?}")]
    DuplicateKey(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Why a sealed artifact failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealError {
    #[error("manifest carries no seal")]
    MissingSeal,

    #[error("unsupported seal algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("malformed seal digest: {0}")]
    MalformedDigest(String),

    #[error("seal digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

/// A manifest field required for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestField {
    Anchor,
    DlpClassification,
    DlpContextTag,
}

impl ManifestField {
    /// Dotted path of the field in the wire shape.
    pub fn path(self) -> &'static str {
        match self {
            ManifestField::Anchor => "anchor",
            ManifestField::DlpClassification => "dlp.classification",
            ManifestField::DlpContextTag => "dlp.context_tag",
        }
    }
}

impl fmt::Display for ManifestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Manifest validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no manifest supplied: anchor, dlp.classification, dlp.context_tag are required")]
    MissingManifest,

    #[error("manifest incomplete: missing {}", join_fields(.missing))]
    Incomplete { missing: Vec<ManifestField> },
}

pub fn join_fields(fields: &[ManifestField]) -> String {
    fields
        .iter()
        .map(|f| f.path())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
