//! The export guard.
//!
//! Every export passes through [`ExportGuard::guard_export`], which decides
//! how strictly to treat the manifest, seals the artifact and optionally cuts
//! a glyphcard. Resolution order for each knob is: per-call
//! [`ExportOptions`], then the guard's [`GuardConfig`], then the compiled-in
//! default.
//!
//! | policy   | no manifest                 | incomplete manifest           |
//! |----------|-----------------------------|-------------------------------|
//! | `off`    | default attached, silent    | sealed as-is, silent          |
//! | `warn`   | default attached, 1 warning | sealed as-is, 1 warning       |
//! | `strict` | error                       | error naming missing fields   |

use std::fmt;

use glyphseal_core::error::join_fields;
use glyphseal_core::{
    create_seal, default_manifest, missing_fields, validate_manifest, Manifest, ManifestField,
    ManifestOverrides, SealedArtifact, ValidationError, ValueGraph,
};

use crate::config::GuardConfig;
use crate::error::Result;
use crate::glyphcard::Glyphcard;
use crate::policy::Policy;

/// Glyphcards are off unless asked for.
pub const DEFAULT_MAKE_GLYPHCARD: bool = false;

/// Redaction is on unless turned off.
pub const DEFAULT_REDACT: bool = true;

/// Per-call options. Any field left `None` defers to the guard's config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    pub policy: Option<Policy>,
    pub manifest: Option<Manifest>,
    pub make_glyphcard: Option<bool>,
    pub redact: Option<bool>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn glyphcard(mut self, enabled: bool) -> Self {
        self.make_glyphcard = Some(enabled);
        self
    }

    pub fn redact(mut self, enabled: bool) -> Self {
        self.redact = Some(enabled);
        self
    }
}

/// A non-fatal finding reported by a `warn` export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportWarning {
    /// No manifest was supplied; a default one was built and sealed.
    ManifestAutoAttached,
    /// The supplied manifest was sealed despite missing required fields.
    ManifestIncomplete { missing: Vec<ManifestField> },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::ManifestAutoAttached => {
                f.write_str("no manifest supplied; default manifest auto-attached")
            }
            ExportWarning::ManifestIncomplete { missing } => {
                write!(
                    f,
                    "manifest incomplete: missing {}; sealed anyway",
                    join_fields(missing)
                )
            }
        }
    }
}

/// What a successful export produced.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub sealed: SealedArtifact,
    pub glyphcard: Option<Glyphcard>,
    pub warnings: Vec<ExportWarning>,
}

impl ExportOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// The knobs of one export after layering options over config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub policy: Policy,
    pub make_glyphcard: bool,
    pub redact: bool,
}

/// Policy engine in front of the seal engine.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct ExportGuard {
    config: GuardConfig,
}

impl ExportGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// A guard configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(GuardConfig::from_env())
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Layer per-call options over the ambient config and defaults.
    pub fn resolve(&self, options: &ExportOptions) -> Resolved {
        Resolved {
            policy: options
                .policy
                .or(self.config.policy)
                .unwrap_or_default(),
            make_glyphcard: options
                .make_glyphcard
                .or(self.config.make_glyphcard)
                .unwrap_or(DEFAULT_MAKE_GLYPHCARD),
            redact: options
                .redact
                .or(self.config.redact)
                .unwrap_or(DEFAULT_REDACT),
        }
    }

    /// Seal `artifact` under the resolved policy.
    ///
    /// The artifact is never modified; the sealed copy is independent of it.
    /// Under `strict` the call fails with [`GuardError::Validation`] and
    /// nothing is sealed.
    ///
    /// [`GuardError::Validation`]: crate::GuardError::Validation
    pub fn guard_export(
        &self,
        artifact: &ValueGraph,
        options: ExportOptions,
    ) -> Result<ExportOutcome> {
        let resolved = self.resolve(&options);
        let mut warnings = Vec::new();

        let manifest = match (resolved.policy, options.manifest) {
            (Policy::Strict, None) => {
                tracing::debug!(policy = %resolved.policy, "export rejected: no manifest");
                return Err(ValidationError::MissingManifest.into());
            }
            (Policy::Strict, Some(manifest)) => {
                if let Err(e) = validate_manifest(&manifest) {
                    tracing::debug!(policy = %resolved.policy, error = %e, "export rejected");
                    return Err(e.into());
                }
                manifest
            }
            (Policy::Warn, None) => {
                warnings.push(ExportWarning::ManifestAutoAttached);
                default_manifest(ManifestOverrides::default())
            }
            (Policy::Warn, Some(manifest)) => {
                let missing = missing_fields(&manifest);
                if !missing.is_empty() {
                    warnings.push(ExportWarning::ManifestIncomplete { missing });
                }
                manifest
            }
            (Policy::Off, manifest) => {
                manifest.unwrap_or_else(|| default_manifest(ManifestOverrides::default()))
            }
        };

        if !resolved.policy.is_silent() {
            for warning in &warnings {
                tracing::warn!(policy = %resolved.policy, "{}", warning);
            }
        }

        let sealed = create_seal(artifact, &manifest);
        let glyphcard = resolved
            .make_glyphcard
            .then(|| Glyphcard::from_sealed(&sealed, resolved.redact));

        tracing::debug!(
            policy = %resolved.policy,
            anchor = %sealed.manifest.anchor,
            glyphcard = glyphcard.is_some(),
            warnings = warnings.len(),
            "export sealed"
        );

        Ok(ExportOutcome {
            sealed,
            glyphcard,
            warnings,
        })
    }
}

/// Guard an export with no ambient configuration.
pub fn guard_export(artifact: &ValueGraph, options: ExportOptions) -> Result<ExportOutcome> {
    ExportGuard::default().guard_export(artifact, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use glyphseal_core::registry::anchors;
    use glyphseal_core::{canonicalize, verify_seal, Classification, ManifestBuilder};
    use serde_json::json;

    fn artifact() -> ValueGraph {
        ValueGraph::from(json!({"x": 1}))
    }

    fn complete_manifest() -> Manifest {
        ManifestBuilder::new(anchors::RESEARCH)
            .classification(Classification::Internal)
            .context_tag("quarterly-report")
            .build()
    }

    fn incomplete_manifest() -> Manifest {
        let mut m = complete_manifest();
        m.dlp.context_tag = None;
        m
    }

    #[test]
    fn test_off_without_manifest() {
        let out = guard_export(&artifact(), ExportOptions::new().policy(Policy::Off)).unwrap();
        assert!(out.warnings.is_empty());
        assert!(out.sealed.manifest.seal.is_some());
        assert!(out.glyphcard.is_none());
        assert!(verify_seal(&out.sealed));
    }

    #[test]
    fn test_off_seals_incomplete_manifest_silently() {
        let out = guard_export(
            &artifact(),
            ExportOptions::new()
                .policy(Policy::Off)
                .manifest(incomplete_manifest()),
        )
        .unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.sealed.manifest.dlp.context_tag, None);
        assert!(verify_seal(&out.sealed));
    }

    #[test]
    fn test_strict_without_manifest_fails() {
        let err = guard_export(&artifact(), ExportOptions::new().policy(Policy::Strict))
            .unwrap_err();
        assert!(matches!(
            err,
            GuardError::Validation(ValidationError::MissingManifest)
        ));
        assert_eq!(err.missing_fields().len(), 3);
    }

    #[test]
    fn test_strict_with_incomplete_manifest_fails() {
        let err = guard_export(
            &artifact(),
            ExportOptions::new()
                .policy(Policy::Strict)
                .manifest(incomplete_manifest()),
        )
        .unwrap_err();
        assert_eq!(err.missing_fields(), &[ManifestField::DlpContextTag]);
        assert!(err.to_string().contains("dlp.context_tag"));
    }

    #[test]
    fn test_strict_with_complete_manifest() {
        let manifest = complete_manifest();
        let out = guard_export(
            &artifact(),
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
    fn test_warn_without_manifest() {
        let out = guard_export(&artifact(), ExportOptions::new().policy(Policy::Warn)).unwrap();
        assert_eq!(out.warnings, vec![ExportWarning::ManifestAutoAttached]);
        assert!(out.sealed.manifest.seal.is_some());
        assert!(out.warnings[0].to_string().contains("auto-attached"));
    }

    #[test]
    fn test_warn_with_incomplete_manifest() {
        let out = guard_export(
            &artifact(),
            ExportOptions::new()
                .policy(Policy::Warn)
                .manifest(incomplete_manifest()),
        )
        .unwrap();
        assert_eq!(
            out.warnings,
            vec![ExportWarning::ManifestIncomplete {
                missing: vec![ManifestField::DlpContextTag]
            }]
        );
        assert!(out.warnings[0].to_string().contains("dlp.context_tag"));
        assert!(verify_seal(&out.sealed));
    }

    #[test]
    fn test_warn_is_default_policy() {
        let out = guard_export(&artifact(), ExportOptions::new()).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_glyphcard_redacts_by_default() {
        let secret = ValueGraph::from(json!({"secretKey": "abc"}));
        let out = guard_export(&secret, ExportOptions::new().glyphcard(true)).unwrap();
        let card = out.glyphcard.unwrap();
        assert!(card.redacted);
        assert!(!card.render().contains("abc"));
        // The sealed artifact itself is untouched.
        assert_eq!(out.sealed.artifact.to_json(), json!({"secretKey": "abc"}));
    }

    #[test]
    fn test_options_override_config() {
        let guard = ExportGuard::new(
            GuardConfig::default()
                .with_policy(Policy::Strict)
                .with_glyphcard(true)
                .with_redaction(false),
        );

        let resolved = guard.resolve(&ExportOptions::new());
        assert_eq!(
            resolved,
            Resolved {
                policy: Policy::Strict,
                make_glyphcard: true,
                redact: false
            }
        );

        let resolved = guard.resolve(
            &ExportOptions::new()
                .policy(Policy::Off)
                .glyphcard(false)
                .redact(true),
        );
        assert_eq!(
            resolved,
            Resolved {
                policy: Policy::Off,
                make_glyphcard: false,
                redact: true
            }
        );
    }

    #[test]
    fn test_ambient_config_applies() {
        let guard = ExportGuard::new(GuardConfig::default().with_policy(Policy::Strict));
        assert!(guard.guard_export(&artifact(), ExportOptions::new()).is_err());

        let guard = ExportGuard::new(GuardConfig::default().with_glyphcard(true));
        let out = guard.guard_export(&artifact(), ExportOptions::new()).unwrap();
        assert!(out.glyphcard.is_some());
    }

    #[test]
    fn test_artifact_not_mutated() {
        let a = ValueGraph::from(json!({"token": "t0", "items": [1, 2, 3]}));
        let before = canonicalize(&a);
        let _ = guard_export(&a, ExportOptions::new().glyphcard(true)).unwrap();
        assert_eq!(canonicalize(&a), before);
    }

    #[test]
    fn test_guard_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExportGuard>();
        assert_send_sync::<ExportOutcome>();
    }
}
