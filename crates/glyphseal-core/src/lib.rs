//! # Glyphseal Core
//!
//! Pure primitives for Glyphseal: value graphs, canonicalization, manifests
//! and seals.
//!
//! This crate contains no I/O, no storage, no networking and no shared
//! state. Every function is a computation over in-memory values and may be
//! called concurrently from any number of threads.
//!
//! ## Key Types
//!
//! - [`ValueGraph`] - An artifact: a possibly cyclic value addressed by [`NodeId`] handles
//! - [`Manifest`] - The metadata envelope (anchor, tags, DLP classification, seal)
//! - [`SealedArtifact`] - An artifact paired with a sealed manifest
//! - [`Sha256Digest`] - The digest type behind every seal
//!
//! ## Canonicalization
//!
//! Seals are SHA-256 digests of a deterministic text encoding. See the
//! [`canonical`] module.
//!
//! ## Guarantees
//!
//! Seals give tamper evidence only. Anyone able to recompute SHA-256 can
//! forge a matching seal; nothing here encrypts or signs.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod seal;
pub mod validation;
pub mod value;

pub use canonical::{canonicalize, canonicalize_from};
pub use crypto::Sha256Digest;
pub use error::{CoreError, ManifestField, SealError, ValidationError};
pub use manifest::{
    default_manifest, timestamp_now, Classification, Dlp, Manifest, ManifestBuilder,
    ManifestOverrides, Seal, SEAL_ALGO,
};
pub use seal::{
    check_seal, compute_digest, create_seal, create_seal_at, seal_preimage, verify_seal,
    verify_seal_json, SealedArtifact,
};
pub use validation::{is_complete, missing_fields, validate_manifest};
pub use value::{Key, Node, NodeId, Number, ValueGraph, CIRCULAR_MARKER, MAX_SERDE_DEPTH};
