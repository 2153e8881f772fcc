//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use glyphseal_core::registry::anchors;
use glyphseal_core::{
    create_seal_at, Classification, Manifest, ManifestBuilder, ManifestField, NodeId,
    SealedArtifact, ValueGraph,
};
use glyphseal_guard::{ExportGuard, ExportOptions, ExportOutcome, GuardConfig, Result};
use serde_json::json;

/// Export time pinned by every fixture manifest.
pub const FIXED_TIME: &str = "2026-01-14T12:00:00.000Z";

/// A guard with a pinned clock for manifests.
pub struct TestFixture {
    pub guard: ExportGuard,
}

impl TestFixture {
    /// A fixture with no ambient configuration.
    pub fn new() -> Self {
        Self::with_config(GuardConfig::default())
    }

    pub fn with_config(config: GuardConfig) -> Self {
        Self {
            guard: ExportGuard::new(config),
        }
    }

    /// A complete manifest for `anchor` with a pinned export time.
    pub fn manifest(&self, anchor: &str) -> Manifest {
        complete_manifest(anchor)
    }

    /// Seal with a pinned `created_at`, so repeated calls are identical.
    pub fn seal(&self, artifact: &ValueGraph) -> SealedArtifact {
        create_seal_at(artifact, &self.manifest(anchors::RESEARCH), FIXED_TIME)
    }

    pub fn export(&self, artifact: &ValueGraph, options: ExportOptions) -> Result<ExportOutcome> {
        self.guard.guard_export(artifact, options)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A manifest satisfying the completeness invariant.
pub fn complete_manifest(anchor: &str) -> Manifest {
    ManifestBuilder::new(anchor)
        .classification(Classification::Internal)
        .context_tag("test-export")
        .team("testkit")
        .export_time(FIXED_TIME)
        .build()
}

/// A complete manifest with one required field removed.
pub fn manifest_missing(field: ManifestField) -> Manifest {
    let mut m = complete_manifest(anchors::RESEARCH);
    match field {
        ManifestField::Anchor => m.anchor.clear(),
        ManifestField::DlpClassification => m.dlp.classification = None,
        ManifestField::DlpContextTag => m.dlp.context_tag = None,
    }
    m
}

/// A small nested artifact.
pub fn sample_artifact() -> ValueGraph {
    ValueGraph::from(json!({
        "title": "quarterly review",
        "scores": [90, 85, 77],
        "meta": {"reviewer": "ops", "final": true, "ratio": 0.75}
    }))
}

/// An artifact with credential-shaped fields.
pub fn secret_artifact() -> ValueGraph {
    ValueGraph::from(json!({
        "name": "deploy",
        "secretKey": "abc",
        "db": {"host": "db.internal", "password": "hunter2"},
        "apiToken": "tok-123"
    }))
}

/// `{"name": "loop", "self": <root>}`.
pub fn self_referential() -> ValueGraph {
    let mut g = ValueGraph::object();
    let root = g.root();
    let name = g.add_text("loop");
    insert(&mut g, root, "name", name);
    insert(&mut g, root, "self", root);
    g
}

/// `a = {"b": b}`, `b = {"a": a}`, rooted at `a`.
pub fn mutual_cycle() -> ValueGraph {
    let mut g = ValueGraph::object();
    let a = g.root();
    let b = g.add_object();
    insert(&mut g, a, "b", b);
    insert(&mut g, b, "a", a);
    g
}

/// `depth` nested single-element arrays around `0`.
pub fn deep_nesting(depth: usize) -> ValueGraph {
    let mut g = ValueGraph::array();
    let mut current = g.root();
    for _ in 1..depth {
        let next = g.add_array();
        push(&mut g, current, next);
        current = next;
    }
    let leaf = g.add_number(0);
    push(&mut g, current, leaf);
    g
}

// Fixture handles all come from the graph being built.
fn insert(g: &mut ValueGraph, object: NodeId, key: &str, child: NodeId) {
    let inserted = g.insert(object, key, child);
    debug_assert!(inserted.is_ok(), "fixture key {}: {:?}", key, inserted);
}

fn push(g: &mut ValueGraph, array: NodeId, child: NodeId) {
    let pushed = g.push(array, child);
    debug_assert!(pushed.is_ok(), "fixture item: {:?}", pushed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphseal_core::{canonicalize, is_complete, missing_fields};
    use glyphseal_guard::Policy;

    #[test]
    fn test_complete_manifest() {
        assert!(is_complete(&complete_manifest(anchors::ETHICS)));
    }

    #[test]
    fn test_manifest_missing_each_field() {
        for field in [
            ManifestField::Anchor,
            ManifestField::DlpClassification,
            ManifestField::DlpContextTag,
        ] {
            assert_eq!(missing_fields(&manifest_missing(field)), vec![field]);
        }
    }

    #[test]
    fn test_cyclic_fixtures() {
        assert!(self_referential().has_cycle());
        assert!(mutual_cycle().has_cycle());
        assert_eq!(canonicalize(&mutual_cycle()), r#"{"b":{"a":[Circular]}}"#);
    }

    #[test]
    fn test_deep_nesting() {
        assert_eq!(canonicalize(&deep_nesting(3)), "[[[0]]]");
    }

    #[test]
    fn test_fixture_seal_is_stable() {
        let fixture = TestFixture::new();
        let a = fixture.seal(&sample_artifact());
        let b = fixture.seal(&sample_artifact());
        assert_eq!(a.manifest, b.manifest);
        assert!(a.verify());
    }

    #[test]
    fn test_fixture_export_uses_its_guard() {
        let fixture = TestFixture::with_config(GuardConfig::default().with_policy(Policy::Strict));
        assert!(fixture.export(&sample_artifact(), ExportOptions::new()).is_err());

        let out = fixture
            .export(
                &sample_artifact(),
                ExportOptions::new().manifest(fixture.manifest(anchors::RESEARCH)),
            )
            .unwrap();
        assert!(out.warnings.is_empty());
        assert!(out.sealed.verify());
    }
}
