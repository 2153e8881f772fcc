//! Glyphcards: reduced, optionally redacted projections of an artifact.
//!
//! A glyphcard travels next to a sealed artifact for display and triage.
//! It is derived, never authoritative, and is not covered by the seal.
//!
//! The projection is bounded: nesting beyond [`MAX_DEPTH`] collapses to
//! [`ELISION_MARKER`], arrays keep at most [`MAX_ARRAY_ITEMS`] elements and
//! text is cut to [`MAX_TEXT_CHARS`] characters. Cycles render as
//! [`CIRCULAR_MARKER`]. With redaction on, values under sensitive keys are
//! replaced by [`REDACTION_MARKER`] whatever their shape.

use glyphseal_core::{
    Classification, Node, NodeId, SealedArtifact, ValueGraph, CIRCULAR_MARKER,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashSet;
use std::fmt;

/// Replaces the value of a sensitive field.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Replaces a composite nested too deeply to show.
pub const ELISION_MARKER: &str = "[…]";

pub const MAX_DEPTH: usize = 6;
pub const MAX_ARRAY_ITEMS: usize = 32;
pub const MAX_TEXT_CHARS: usize = 256;

/// Key fragments that mark a field as sensitive.
///
/// Matched against the key lowercased with every non-alphanumeric character
/// removed, so `api_key`, `apiKey` and `API-KEY` all match `apikey`.
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "secret",
    "password",
    "passwd",
    "passphrase",
    "token",
    "apikey",
    "privatekey",
    "credential",
    "authorization",
    "cookie",
    "session",
];

/// Normalized keys that are sensitive only as a whole word.
const SENSITIVE_KEYS_EXACT: &[&str] = &["auth", "pwd", "pin"];

/// Whether a field name suggests secret or credential material.
pub fn is_sensitive_key(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    SENSITIVE_KEYS_EXACT.contains(&normalized.as_str())
        || SENSITIVE_KEY_FRAGMENTS
            .iter()
            .any(|fragment| normalized.contains(fragment))
}

/// A derived projection of a sealed artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyphcard {
    pub anchor: String,

    /// Digest of the seal this card was cut from, if sealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    /// Whether the redaction pass ran.
    pub redacted: bool,

    /// Number of fields replaced by the redaction marker.
    pub redacted_fields: usize,

    /// The projected artifact.
    pub fields: Json,
}

impl Glyphcard {
    /// Cut a glyphcard from a sealed artifact.
    pub fn from_sealed(sealed: &SealedArtifact, redact: bool) -> Self {
        let mut projector = Projector {
            graph: &sealed.artifact,
            redact,
            redacted_fields: 0,
            on_path: HashSet::new(),
        };
        let fields = projector.project(sealed.artifact.root(), 0);

        Self {
            anchor: sealed.manifest.anchor.clone(),
            digest: sealed.seal().map(|s| s.digest.clone()),
            classification: sealed.manifest.dlp.classification,
            redacted: redact,
            redacted_fields: projector.redacted_fields,
            fields,
        }
    }

    /// Render as indented JSON text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Glyphcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

struct Projector<'a> {
    graph: &'a ValueGraph,
    redact: bool,
    redacted_fields: usize,
    on_path: HashSet<NodeId>,
}

impl Projector<'_> {
    fn project(&mut self, id: NodeId, depth: usize) -> Json {
        let Some(node) = self.graph.node(id) else {
            return Json::Null;
        };
        match node {
            Node::Null => Json::Null,
            Node::Bool(b) => Json::Bool(*b),
            Node::Number(n) => n.to_json(),
            Node::Text(s) => Json::String(truncate(s)),
            Node::Array(_) | Node::Object(_) if self.on_path.contains(&id) => {
                Json::String(CIRCULAR_MARKER.to_string())
            }
            Node::Array(_) | Node::Object(_) if depth >= MAX_DEPTH => {
                Json::String(ELISION_MARKER.to_string())
            }
            Node::Array(items) => {
                self.on_path.insert(id);
                let mut out: Vec<Json> = items
                    .iter()
                    .take(MAX_ARRAY_ITEMS)
                    .map(|child| self.project(*child, depth + 1))
                    .collect();
                if items.len() > MAX_ARRAY_ITEMS {
                    out.push(Json::String(format!(
                        "[+{} more]",
                        items.len() - MAX_ARRAY_ITEMS
                    )));
                }
                self.on_path.remove(&id);
                Json::Array(out)
            }
            Node::Object(entries) => {
                self.on_path.insert(id);
                let mut out = serde_json::Map::new();
                for (key, child) in entries {
                    let value = if self.redact && is_sensitive_key(key.as_str()) {
                        self.redacted_fields += 1;
                        Json::String(REDACTION_MARKER.to_string())
                    } else {
                        self.project(*child, depth + 1)
                    };
                    out.insert(key.as_str().to_string(), value);
                }
                self.on_path.remove(&id);
                Json::Object(out)
            }
        }
    }
}

fn truncate(s: &str) -> String {
    match s.char_indices().nth(MAX_TEXT_CHARS) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphseal_core::{create_seal, default_manifest, ManifestOverrides};
    use serde_json::json;

    fn card(value: Json, redact: bool) -> Glyphcard {
        let sealed = create_seal(
            &ValueGraph::from(value),
            &default_manifest(ManifestOverrides::default()),
        );
        Glyphcard::from_sealed(&sealed, redact)
    }

    #[test]
    fn test_sensitive_key_patterns() {
        for key in [
            "secretKey",
            "client_secret",
            "password",
            "DB_PASSWD",
            "apiKey",
            "api-key",
            "accessToken",
            "private_key",
            "credentials",
            "Authorization",
            "auth",
            "session_id",
        ] {
            assert!(is_sensitive_key(key), "{} should be sensitive", key);
        }
        for key in ["author", "name", "title", "pinned", "authority"] {
            assert!(!is_sensitive_key(key), "{} should not be sensitive", key);
        }
    }

    #[test]
    fn test_redaction_replaces_values() {
        let c = card(json!({"secretKey": "abc", "name": "demo"}), true);
        assert!(c.redacted);
        assert_eq!(c.redacted_fields, 1);
        assert_eq!(c.fields, json!({"secretKey": "[REDACTED]", "name": "demo"}));
        assert!(!c.render().contains("abc"));
    }

    #[test]
    fn test_redaction_covers_nested_composites() {
        let c = card(
            json!({"config": {"credentials": {"user": "u", "pass": "hunter2"}, "region": "eu"}}),
            true,
        );
        assert_eq!(
            c.fields,
            json!({"config": {"credentials": "[REDACTED]", "region": "eu"}})
        );
        assert!(!c.render().contains("hunter2"));
    }

    #[test]
    fn test_redaction_disabled() {
        let c = card(json!({"secretKey": "abc"}), false);
        assert!(!c.redacted);
        assert_eq!(c.redacted_fields, 0);
        assert!(c.render().contains("abc"));
    }

    #[test]
    fn test_card_carries_seal_digest() {
        let sealed = create_seal(
            &ValueGraph::from(json!({"x": 1})),
            &default_manifest(ManifestOverrides::default()),
        );
        let c = Glyphcard::from_sealed(&sealed, true);
        assert_eq!(c.digest.as_deref(), sealed.seal().map(|s| s.digest.as_str()));
        assert_eq!(c.anchor, sealed.manifest.anchor);
        assert_eq!(c.classification, Some(Classification::Open));
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut value = json!("leaf");
        for _ in 0..(MAX_DEPTH + 3) {
            value = json!({ "n": value });
        }
        let c = card(value, true);
        assert!(c.render().contains(ELISION_MARKER));
        assert!(!c.render().contains("leaf"));
    }

    #[test]
    fn test_arrays_and_text_are_capped() {
        let items: Vec<u32> = (0..40).collect();
        let long = "x".repeat(MAX_TEXT_CHARS + 10);
        let c = card(json!({"items": items, "long": long}), true);

        let projected = c.fields["items"].as_array().unwrap();
        assert_eq!(projected.len(), MAX_ARRAY_ITEMS + 1);
        assert_eq!(projected.last(), Some(&json!("[+8 more]")));

        let text = c.fields["long"].as_str().unwrap();
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS + 1);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_numbers_render_exactly() {
        let c = card(json!({"big": u64::MAX, "neg": -3, "f": 0.5}), true);
        assert_eq!(c.fields, json!({"big": u64::MAX, "neg": -3, "f": 0.5}));
    }

    #[test]
    fn test_cycles_render_marker() {
        let mut g = ValueGraph::object();
        let root = g.root();
        g.insert(root, "me", root).unwrap();
        let sealed = create_seal(&g, &default_manifest(ManifestOverrides::default()));

        let c = Glyphcard::from_sealed(&sealed, true);
        assert_eq!(c.fields, json!({"me": "[Circular]"}));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn sensitive_key() -> impl Strategy<Value = &'static str> {
            prop::sample::select(vec![
                "password", "apiKey", "client_secret", "AUTH", "sessionToken", "private-key",
            ])
        }

        proptest! {
            #[test]
            fn prop_sensitive_values_never_rendered(
                key in sensitive_key(),
                secret in "SECRET-[0-9]{6}",
                benign in prop::collection::btree_map("[a-z]{1,8}", "[a-z]{0,8}", 0..8),
                depth in 0usize..4,
            ) {
                let mut fields = serde_json::Map::new();
                fields.insert(key.to_string(), json!(secret.clone()));
                for (k, v) in benign {
                    fields.entry(k).or_insert(json!(v));
                }
                let mut value = Json::Object(fields);
                for _ in 0..depth {
                    value = json!({ "wrap": value });
                }

                let c = card(value, true);
                prop_assert!(!c.render().contains(&secret));
                prop_assert!(c.redacted_fields >= 1);
            }
        }
    }
}
