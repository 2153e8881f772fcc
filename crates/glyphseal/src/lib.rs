//! # Glyphseal
//!
//! The unified API for Glyphseal: tamper-evident sealing of artifacts
//! behind a policy-gated export guard.
//!
//! ## Overview
//!
//! - **Canonicalization**: a deterministic, order-independent text form of
//!   any value graph, cycles included
//! - **Manifests**: the metadata envelope (anchor, tags, DLP classification)
//! - **Seals**: a SHA-256 digest over artifact and manifest, embedded in the
//!   manifest
//! - **Export guard**: decides per export whether a complete manifest is
//!   required and whether to cut a redacted glyphcard
//!
//! Seals are tamper evidence, not signatures. Anyone who can recompute
//! SHA-256 can produce a matching seal.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use glyphseal::{ExportGuard, ExportOptions, GuardConfig, ValueGraph};
//! use serde_json::json;
//!
//! let guard = ExportGuard::new(GuardConfig::from_env());
//! let artifact = ValueGraph::from(json!({"findings": [1, 2, 3]}));
//!
//! let outcome = guard
//!     .guard_export(&artifact, ExportOptions::new().glyphcard(true))
//!     .unwrap();
//! assert!(glyphseal::verify_seal(&outcome.sealed));
//!
//! glyphseal::wire::write_sealed(std::io::stdout(), &outcome.sealed).unwrap();
//! ```
//!
//! ## Re-exports
//!
//! - `glyphseal::core` - value graphs, canonicalization, manifests, seals
//! - `glyphseal::guard` - policy, configuration, glyphcards, export guard

pub mod error;
pub mod wire;

// Re-export component crates
pub use glyphseal_core as core;
pub use glyphseal_guard as guard;

// Re-export main types for convenience
pub use error::{GlyphsealError, Result};

pub use glyphseal_core::{
    canonicalize, check_seal, create_seal, create_seal_at, default_manifest, validate_manifest,
    verify_seal, verify_seal_json, Classification, Dlp, Manifest, ManifestBuilder,
    ManifestOverrides, Seal, SealError, SealedArtifact, Sha256Digest, ValueGraph,
};
pub use glyphseal_guard::{
    guard_export, ExportGuard, ExportOptions, ExportOutcome, ExportWarning, Glyphcard,
    GuardConfig, GuardError, Policy,
};
