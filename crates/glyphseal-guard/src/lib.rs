//! # Glyphseal Guard
//!
//! Policy-gated exports on top of [`glyphseal_core`].
//!
//! ## Overview
//!
//! An export hands an artifact (and optionally a manifest) to an
//! [`ExportGuard`]. The guard resolves a [`Policy`], decides what to do about
//! a missing or incomplete manifest, seals the artifact and can cut a
//! redacted [`Glyphcard`] for display.
//!
//! ## Configuration
//!
//! Ambient defaults live in a [`GuardConfig`], built once per process with
//! [`GuardConfig::from_env`] and passed to [`ExportGuard::new`]. Per-call
//! [`ExportOptions`] take precedence over it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use glyphseal_core::ValueGraph;
//! use glyphseal_guard::{ExportGuard, ExportOptions, GuardConfig, Policy};
//!
//! let guard = ExportGuard::new(GuardConfig::from_env());
//! let artifact = ValueGraph::from(serde_json::json!({"x": 1}));
//!
//! let outcome = guard
//!     .guard_export(&artifact, ExportOptions::new().policy(Policy::Warn))
//!     .unwrap();
//! for warning in &outcome.warnings {
//!     eprintln!("{}", warning);
//! }
//! ```

pub mod config;
pub mod error;
pub mod glyphcard;
pub mod guard;
pub mod policy;

pub use config::GuardConfig;
pub use error::{GuardError, Result};
pub use glyphcard::{is_sensitive_key, Glyphcard, REDACTION_MARKER};
pub use guard::{guard_export, ExportGuard, ExportOptions, ExportOutcome, ExportWarning, Resolved};
pub use policy::Policy;
