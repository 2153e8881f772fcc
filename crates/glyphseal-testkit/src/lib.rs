//! # Glyphseal Testkit
//!
//! Testing utilities for Glyphseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known canonical encodings and digests that every implementation must reproduce
//! - **Generators**: Proptest strategies for value graphs, manifests and policies
//! - **Fixtures**: Pinned manifests and ready-made artifacts, cyclic ones included
//!
//! ## Golden Vectors
//!
//! ```rust
//! use glyphseal_testkit::vectors::{all_vectors, seal_vector, verify_all_vectors};
//!
//! assert!(verify_all_vectors().is_empty());
//! assert!(seal_vector().holds());
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.sha256);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use glyphseal_testkit::generators::{json_value, graph_reversed};
//!
//! proptest! {
//!     #[test]
//!     fn insertion_order_is_irrelevant(value in json_value()) {
//!         let a = glyphseal_core::ValueGraph::from(&value);
//!         let b = graph_reversed(&value);
//!         prop_assert_eq!(glyphseal_core::canonicalize(&a), glyphseal_core::canonicalize(&b));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use glyphseal_testkit::fixtures::{sample_artifact, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let sealed = fixture.seal(&sample_artifact());
//! assert!(sealed.verify());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{complete_manifest, manifest_missing, TestFixture, FIXED_TIME};
pub use generators::{graph_reversed, json_value, value_graph};
pub use vectors::{all_vectors, seal_vector, verify_all_vectors, GoldenVector, SealVector};
