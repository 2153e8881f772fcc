//! Error types for the export guard.

use glyphseal_core::{ManifestField, ValidationError};
use thiserror::Error;

const REQUIRED_FIELDS: &[ManifestField] = &[
    ManifestField::Anchor,
    ManifestField::DlpClassification,
    ManifestField::DlpContextTag,
];

/// Errors that can occur during guarded exports.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Strict policy refused the export.
    #[error("export rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Unrecognised policy name.
    #[error("invalid export policy: {0:?} (expected off, warn or strict)")]
    InvalidPolicy(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] glyphseal_core::CoreError),
}

impl GuardError {
    /// Manifest fields named by a validation failure.
    ///
    /// A missing manifest lacks every required field. Empty for every other
    /// error.
    pub fn missing_fields(&self) -> &[ManifestField] {
        match self {
            GuardError::Validation(ValidationError::Incomplete { missing }) => missing,
            GuardError::Validation(ValidationError::MissingManifest) => REQUIRED_FIELDS,
            _ => &[],
        }
    }
}

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
