//! End-to-end behavior of the sealing layer through the unified API.

use glyphseal::core::registry::anchors;
use glyphseal::core::{ManifestField, ValidationError};
use glyphseal::{
    canonicalize, create_seal, default_manifest, guard_export, verify_seal, Classification,
    ExportGuard, ExportOptions, ExportWarning, GuardConfig, GuardError, ManifestBuilder,
    ManifestOverrides, Policy, ValueGraph,
};
use glyphseal_testkit::fixtures::{complete_manifest, secret_artifact, self_referential};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn x1() -> ValueGraph {
    ValueGraph::from(json!({"x": 1}))
}

// =============================================================================
// Canonicalization
// =============================================================================

#[test]
fn test_structurally_equal_values_canonicalize_equal() {
    let from_json = ValueGraph::from(json!({"list": [1, 2], "flag": true}));

    let mut built = ValueGraph::object();
    let root = built.root();
    let flag = built.add_bool(true);
    let list = built.add_array();
    let one = built.add_number(1);
    let two = built.add_number(2);
    built.push(list, one).unwrap();
    built.push(list, two).unwrap();
    built.insert(root, "flag", flag).unwrap();
    built.insert(root, "list", list).unwrap();

    assert_eq!(canonicalize(&from_json), canonicalize(&built));
}

#[test]
fn test_object_key_order_irrelevant() {
    assert_eq!(
        canonicalize(&ValueGraph::from(json!({"a": 1, "b": 2}))),
        canonicalize(&ValueGraph::from(json!({"b": 2, "a": 1}))),
    );
}

#[test]
fn test_array_order_significant() {
    assert_ne!(
        canonicalize(&ValueGraph::from(json!([3, 1, 2]))),
        canonicalize(&ValueGraph::from(json!([1, 2, 3]))),
    );
}

#[test]
fn test_self_reference_terminates_with_sentinel() {
    let out = canonicalize(&self_referential());
    assert!(out.contains("[Circular]"));
}

// =============================================================================
// Seal engine
// =============================================================================

#[test]
fn test_digest_deterministic_and_well_formed() {
    init_tracing();
    let manifest = default_manifest(ManifestOverrides::default());
    let a = create_seal(&x1(), &manifest);
    let b = create_seal(&x1(), &manifest);

    let (sa, sb) = (a.seal().unwrap(), b.seal().unwrap());
    assert_eq!(sa.digest, sb.digest);
    assert_eq!(sa.algo, "SHA256");
    assert_eq!(sa.digest.len(), 64);
    assert!(sa
        .digest
        .bytes()
        .all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c)));
}

#[test]
fn test_verify_created_seal() {
    let sealed = create_seal(&x1(), &complete_manifest(anchors::EXPORT));
    assert!(verify_seal(&sealed));
}

#[test]
fn test_artifact_mutation_detected() {
    let mut sealed = create_seal(&x1(), &complete_manifest(anchors::EXPORT));
    let root = sealed.artifact.root();
    let x = sealed.artifact.get(root, "x").unwrap();
    sealed.artifact.set(x, glyphseal::core::Node::Number(2.into())).unwrap();
    assert!(!verify_seal(&sealed));
}

#[test]
fn test_manifest_mutation_detected() {
    let sealed = create_seal(&x1(), &complete_manifest(anchors::EXPORT));

    let mut tampered = sealed.clone();
    tampered.manifest.anchor = anchors::COMMAND.to_string();
    assert!(!verify_seal(&tampered));

    let mut tampered = sealed.clone();
    tampered.manifest.dlp.classification = Some(Classification::Confidential);
    assert!(!verify_seal(&tampered));

    let mut tampered = sealed;
    tampered.manifest.srb_tags.reverse();
    assert!(!verify_seal(&tampered));
}

#[test]
fn test_missing_seal_is_unverified() {
    let mut sealed = create_seal(&x1(), &complete_manifest(anchors::EXPORT));
    sealed.manifest.seal = None;
    assert!(!verify_seal(&sealed));
    assert!(!sealed.verify());
}

// =============================================================================
// Export guard
// =============================================================================

#[test]
fn test_scenario_off() {
    init_tracing();
    let out = guard_export(&x1(), ExportOptions::new().policy(Policy::Off)).unwrap();
    assert!(out.warnings.is_empty());
    assert!(out.sealed.manifest.seal.is_some());
}

#[test]
fn test_scenario_strict_without_manifest() {
    init_tracing();
    let err = guard_export(&x1(), ExportOptions::new().policy(Policy::Strict)).unwrap_err();
    assert!(matches!(
        err,
        GuardError::Validation(ValidationError::MissingManifest)
    ));
    assert!(err.to_string().contains("anchor"));
}

#[test]
fn test_scenario_strict_with_complete_manifest() {
    let manifest = complete_manifest(anchors::CONTINUITY);
    let out = guard_export(
        &x1(),
        ExportOptions::new()
            .policy(Policy::Strict)
            .manifest(manifest.clone()),
    )
    .unwrap();
    assert!(out.warnings.is_empty());
    assert_eq!(out.sealed.manifest.anchor, manifest.anchor);
    assert!(verify_seal(&out.sealed));
}

#[test]
fn test_scenario_warn_without_manifest() {
    init_tracing();
    let out = guard_export(&x1(), ExportOptions::new().policy(Policy::Warn)).unwrap();
    assert_eq!(out.warnings, vec![ExportWarning::ManifestAutoAttached]);
    assert!(out.sealed.manifest.seal.is_some());
}

#[test]
fn test_scenario_glyphcard_redaction() {
    let artifact = ValueGraph::from(json!({"secretKey": "abc"}));
    let out = guard_export(&artifact, ExportOptions::new().glyphcard(true)).unwrap();
    let card = out.glyphcard.expect("glyphcard requested");
    assert!(card.redacted);
    assert!(!card.render().contains("abc"));
}

#[test]
fn test_strict_incomplete_names_every_missing_field() {
    let manifest = ManifestBuilder::new("")
        .dlp(Default::default())
        .build();
    let err = guard_export(
        &x1(),
        ExportOptions::new().policy(Policy::Strict).manifest(manifest),
    )
    .unwrap_err();
    assert_eq!(
        err.missing_fields(),
        &[
            ManifestField::Anchor,
            ManifestField::DlpClassification,
            ManifestField::DlpContextTag
        ]
    );
    let message = err.to_string();
    assert!(message.contains("dlp.classification"));
    assert!(message.contains("dlp.context_tag"));
}

#[test]
fn test_glyphcard_redaction_can_be_disabled() {
    let out = guard_export(
        &secret_artifact(),
        ExportOptions::new().glyphcard(true).redact(false),
    )
    .unwrap();
    let card = out.glyphcard.unwrap();
    assert!(!card.redacted);
    assert!(card.render().contains("hunter2"));
}

#[test]
fn test_glyphcard_redacts_nested_credentials() {
    let out = guard_export(&secret_artifact(), ExportOptions::new().glyphcard(true)).unwrap();
    let card = out.glyphcard.unwrap();
    let rendered = card.render();
    for secret in ["abc", "hunter2", "tok-123"] {
        assert!(!rendered.contains(secret), "{} leaked", secret);
    }
    assert!(rendered.contains("db.internal"));
    assert_eq!(card.redacted_fields, 3);
    assert_eq!(card.digest.as_ref(), Some(&out.sealed.seal().unwrap().digest));
}

#[test]
fn test_ambient_config_layering() {
    let guard = ExportGuard::new(GuardConfig::from_lookup(|name| match name {
        "GLYPHSEAL_EXPORT_POLICY" => Some("strict".to_string()),
        "GLYPHSEAL_GLYPHCARD" => Some("true".to_string()),
        _ => None,
    }));

    // Ambient strict applies without options.
    assert!(guard.guard_export(&x1(), ExportOptions::new()).is_err());

    // Call-level policy wins over ambient.
    let out = guard
        .guard_export(&x1(), ExportOptions::new().policy(Policy::Off))
        .unwrap();
    assert!(out.glyphcard.is_some());
    assert!(out.warnings.is_empty());
}

#[test]
fn test_text_reports_pass_through_guard() {
    let report = String::from("# Continuity report\n\nAll systems nominal.");
    let out = guard_export(
        &ValueGraph::from(report.clone()),
        ExportOptions::new()
            .policy(Policy::Strict)
            .manifest(complete_manifest(anchors::CONTINUITY)),
    )
    .unwrap();
    assert!(verify_seal(&out.sealed));
    assert_eq!(out.sealed.artifact.to_json(), json!(report));
}

#[test]
fn test_cyclic_artifact_seals_and_verifies() {
    let out = guard_export(
        &self_referential(),
        ExportOptions::new().policy(Policy::Off).glyphcard(true),
    )
    .unwrap();
    assert!(verify_seal(&out.sealed));
    assert_eq!(
        out.glyphcard.unwrap().fields,
        json!({"name": "loop", "self": "[Circular]"})
    );
}
