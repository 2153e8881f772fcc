//! Error types for the unified API.

use glyphseal_core::{CoreError, SealError};
use glyphseal_guard::GuardError;
use thiserror::Error;

/// Errors that can occur across Glyphseal operations.
#[derive(Debug, Error)]
pub enum GlyphsealError {
    /// Value graph or wire encoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// A sealed artifact did not verify.
    #[error("seal error: {0}")]
    Seal(#[from] SealError),

    /// The export guard refused or failed.
    #[error("guard error: {0}")]
    Guard(#[from] GuardError),

    /// Reading or writing the wire form failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for unified operations.
pub type Result<T> = std::result::Result<T, GlyphsealError>;
