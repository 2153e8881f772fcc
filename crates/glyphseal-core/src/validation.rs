//! Manifest completeness checks.
//!
//! A manifest is complete when `anchor`, `dlp.classification` and
//! `dlp.context_tag` are all present and non-blank. Strict exports refuse
//! anything less.

use crate::error::{ManifestField, ValidationError};
use crate::manifest::Manifest;

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Fields required for completeness that are missing or blank, in wire order.
pub fn missing_fields(manifest: &Manifest) -> Vec<ManifestField> {
    let mut missing = Vec::new();

    if is_blank(&manifest.anchor) {
        missing.push(ManifestField::Anchor);
    }
    if manifest.dlp.classification.is_none() {
        missing.push(ManifestField::DlpClassification);
    }
    if manifest.dlp.context_tag.as_deref().map_or(true, is_blank) {
        missing.push(ManifestField::DlpContextTag);
    }

    missing
}

/// Whether the manifest satisfies the completeness invariant.
pub fn is_complete(manifest: &Manifest) -> bool {
    missing_fields(manifest).is_empty()
}

/// Validate completeness, naming every missing field on failure.
pub fn validate_manifest(manifest: &Manifest) -> Result<(), ValidationError> {
    let missing = missing_fields(manifest);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Incomplete { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{default_manifest, Classification, Dlp, ManifestBuilder, ManifestOverrides};

    #[test]
    fn test_default_manifest_is_complete() {
        assert!(is_complete(&default_manifest(ManifestOverrides::default())));
    }

    #[test]
    fn test_blank_anchor() {
        let m = ManifestBuilder::new("   ").build();
        assert_eq!(missing_fields(&m), vec![ManifestField::Anchor]);
    }

    #[test]
    fn test_missing_dlp_fields() {
        let m = ManifestBuilder::new("ethics").dlp(Dlp::default()).build();
        assert_eq!(
            missing_fields(&m),
            vec![ManifestField::DlpClassification, ManifestField::DlpContextTag]
        );
    }

    #[test]
    fn test_empty_context_tag() {
        let m = ManifestBuilder::new("ethics")
            .classification(Classification::Open)
            .context_tag("")
            .build();
        assert_eq!(missing_fields(&m), vec![ManifestField::DlpContextTag]);
    }

    #[test]
    fn test_validation_error_names_fields() {
        let m = ManifestBuilder::new("").dlp(Dlp::default()).build();
        let err = validate_manifest(&m).unwrap_err();
        assert_eq!(
            err.to_string(),
            "manifest incomplete: missing anchor, dlp.classification, dlp.context_tag"
        );
    }
}
