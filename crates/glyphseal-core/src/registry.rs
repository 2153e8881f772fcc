//! Registry of known anchors, tags and manifest defaults.
//!
//! These names are carried in manifests and covered by seals. Renaming one
//! changes the digest of every manifest built from the defaults.

/// Schema version written into new manifests.
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Governance protocol tag written into new manifests. Carried, never interpreted.
pub const ETHICS_PROTOCOL: &str = "ethics/v1.2";

/// Team recorded on manifests built from defaults.
pub const DEFAULT_TEAM: &str = "glyphseal";

/// DLP context tag used by the default manifest.
pub const DEFAULT_CONTEXT_TAG: &str = "default-export";

/// Known anchors (logical subsystems an artifact can belong to).
pub mod anchors {
    pub const CONTINUITY: &str = "continuity";
    pub const ETHICS: &str = "ethics";
    pub const COMMAND: &str = "command";
    pub const RESEARCH: &str = "research";
    pub const EXPORT: &str = "export";

    /// Fallback used by the lenient manifest builder.
    pub const GENERAL: &str = "general";

    pub const ALL: &[&str] = &[CONTINUITY, ETHICS, COMMAND, RESEARCH, EXPORT, GENERAL];
}

/// Known SRB tags.
pub mod tags {
    pub const INTEGRITY: &str = "srb:integrity";
    pub const PROVENANCE: &str = "srb:provenance";
    pub const AUDIT: &str = "srb:audit";
    pub const REDACTED: &str = "srb:redacted";

    pub const ALL: &[&str] = &[INTEGRITY, PROVENANCE, AUDIT, REDACTED];
}

/// The two tags every default manifest starts with.
pub const DEFAULT_SRB_TAGS: [&str; 2] = [tags::INTEGRITY, tags::PROVENANCE];

/// Whether `anchor` is one of the registered anchors.
pub fn is_known_anchor(anchor: &str) -> bool {
    anchors::ALL.contains(&anchor)
}

/// Whether `tag` is one of the registered SRB tags.
pub fn is_known_tag(tag: &str) -> bool {
    tags::ALL.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tags_are_registered() {
        assert!(DEFAULT_SRB_TAGS.iter().all(|t| is_known_tag(t)));
    }

    #[test]
    fn test_anchor_lookup() {
        assert!(is_known_anchor(anchors::CONTINUITY));
        assert!(is_known_anchor(anchors::GENERAL));
        assert!(!is_known_anchor("unregistered"));
    }
}
