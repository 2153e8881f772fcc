//! Manifest: the metadata envelope that travels with an artifact.
//!
//! A manifest is built fresh for each export (or supplied by the caller),
//! receives its seal exactly once, and is never changed afterwards. Any
//! later edit to a field other than `seal` breaks verification.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registry::{
    anchors, DEFAULT_CONTEXT_TAG, DEFAULT_SRB_TAGS, DEFAULT_TEAM, ETHICS_PROTOCOL,
    MANIFEST_VERSION,
};
use crate::value::{NodeId, ValueGraph};

/// Algorithm tag written into every seal.
pub const SEAL_ALGO: &str = "SHA256";

/// Wire field names.
mod keys {
    pub const VERSION: &str = "version";
    pub const ANCHOR: &str = "anchor";
    pub const ETHICS_PROTOCOL: &str = "ethics_protocol";
    pub const SRB_TAGS: &str = "srb_tags";
    pub const DLP: &str = "dlp";
    pub const CLASSIFICATION: &str = "classification";
    pub const CONTEXT_TAG: &str = "context_tag";
    pub const NOTES: &str = "notes";
    pub const TEAM: &str = "team";
    pub const EXPORT_TIME: &str = "export_time";
    pub const METADATA: &str = "metadata";
}

/// Current time as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Data-sensitivity level, from least to most sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Open,
    Internal,
    Restricted,
    Confidential,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Open => "open",
            Classification::Internal => "internal",
            Classification::Restricted => "restricted",
            Classification::Confidential => "confidential",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DLP classification sub-record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dlp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

impl Dlp {
    pub fn new(classification: Classification, context_tag: impl Into<String>) -> Self {
        Self {
            classification: Some(classification),
            context_tag: Some(context_tag.into()),
            notes: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.get_or_insert_with(Vec::new).push(note.into());
        self
    }
}

/// The seal record attached by the seal engine.
///
/// Fields are plain strings so that a seal of any shape can be carried and
/// rejected at verification time instead of at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seal {
    pub algo: String,
    pub digest: String,
    pub created_at: String,
}

/// The metadata envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest schema version.
    #[serde(default)]
    pub version: String,

    /// Logical subsystem the artifact belongs to.
    #[serde(default)]
    pub anchor: String,

    /// Governance protocol tag.
    #[serde(default)]
    pub ethics_protocol: String,

    /// Ordered tags. Order is covered by the seal.
    #[serde(default)]
    pub srb_tags: Vec<String>,

    #[serde(default)]
    pub dlp: Dlp,

    #[serde(default)]
    pub team: String,

    /// ISO-8601 export time. Covered by the seal.
    #[serde(default)]
    pub export_time: String,

    /// Free-form metadata bag.
    #[serde(default, alias = "meta", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Present once sealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<Seal>,
}

impl Manifest {
    /// Whether the manifest carries a seal.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    /// A copy of this manifest with any seal removed.
    pub fn without_seal(&self) -> Manifest {
        Manifest {
            seal: None,
            ..self.clone()
        }
    }

    /// Whether `tag` is present, ignoring position.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.srb_tags.iter().any(|t| t == tag)
    }

    /// Value graph of every field except `seal`.
    ///
    /// Absent optional fields are omitted, matching the JSON wire shape, so
    /// a manifest hashes identically before and after a JSON round-trip.
    pub fn unsealed_graph(&self) -> ValueGraph {
        let mut g = ValueGraph::object();
        let root = g.root();

        let v = g.add_text(self.version.as_str());
        put(&mut g, root, keys::VERSION, v);
        let v = g.add_text(self.anchor.as_str());
        put(&mut g, root, keys::ANCHOR, v);
        let v = g.add_text(self.ethics_protocol.as_str());
        put(&mut g, root, keys::ETHICS_PROTOCOL, v);

        let tags = g.add_array();
        for tag in &self.srb_tags {
            let t = g.add_text(tag.as_str());
            append(&mut g, tags, t);
        }
        put(&mut g, root, keys::SRB_TAGS, tags);

        let dlp = g.add_object();
        if let Some(c) = self.dlp.classification {
            let v = g.add_text(c.as_str());
            put(&mut g, dlp, keys::CLASSIFICATION, v);
        }
        if let Some(tag) = &self.dlp.context_tag {
            let v = g.add_text(tag.as_str());
            put(&mut g, dlp, keys::CONTEXT_TAG, v);
        }
        if let Some(notes) = &self.dlp.notes {
            let arr = g.add_array();
            for note in notes {
                let n = g.add_text(note.as_str());
                append(&mut g, arr, n);
            }
            put(&mut g, dlp, keys::NOTES, arr);
        }
        put(&mut g, root, keys::DLP, dlp);

        let v = g.add_text(self.team.as_str());
        put(&mut g, root, keys::TEAM, v);
        let v = g.add_text(self.export_time.as_str());
        put(&mut g, root, keys::EXPORT_TIME, v);

        if let Some(metadata) = &self.metadata {
            let bag = ValueGraph::from_json(&serde_json::Value::Object(metadata.clone()));
            let v = g.graft(&bag);
            put(&mut g, root, keys::METADATA, v);
        }

        g
    }
}

// Both helpers only ever see handles `g` just allocated.

fn put(g: &mut ValueGraph, parent: NodeId, key: &str, child: NodeId) {
    let inserted = g.insert(parent, key, child);
    debug_assert!(inserted.is_ok(), "manifest field {}: {:?}", key, inserted);
}

fn append(g: &mut ValueGraph, array: NodeId, child: NodeId) {
    let pushed = g.push(array, child);
    debug_assert!(pushed.is_ok(), "manifest list item: {:?}", pushed);
}

/// Per-field overrides for [`default_manifest`].
///
/// Every `Some` field replaces the default wholesale. A supplied `dlp`
/// replaces the whole default sub-record; spread [`Dlp::default`] or the
/// registry defaults yourself if you want to keep part of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestOverrides {
    pub version: Option<String>,
    pub anchor: Option<String>,
    pub ethics_protocol: Option<String>,
    pub srb_tags: Option<Vec<String>>,
    pub dlp: Option<Dlp>,
    pub team: Option<String>,
    pub export_time: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_dlp() -> Dlp {
    Dlp::new(Classification::Open, DEFAULT_CONTEXT_TAG)
}

fn default_tags() -> Vec<String> {
    DEFAULT_SRB_TAGS.iter().map(|t| t.to_string()).collect()
}

/// Build a manifest from system defaults with shallow overrides.
///
/// Lenient: a missing anchor falls back to [`anchors::GENERAL`].
pub fn default_manifest(overrides: ManifestOverrides) -> Manifest {
    Manifest {
        version: overrides
            .version
            .unwrap_or_else(|| MANIFEST_VERSION.to_string()),
        anchor: overrides
            .anchor
            .unwrap_or_else(|| anchors::GENERAL.to_string()),
        ethics_protocol: overrides
            .ethics_protocol
            .unwrap_or_else(|| ETHICS_PROTOCOL.to_string()),
        srb_tags: overrides.srb_tags.unwrap_or_else(default_tags),
        dlp: overrides.dlp.unwrap_or_else(default_dlp),
        team: overrides.team.unwrap_or_else(|| DEFAULT_TEAM.to_string()),
        export_time: overrides.export_time.unwrap_or_else(timestamp_now),
        metadata: overrides.metadata,
        seal: None,
    }
}

/// Strict manifest builder: the anchor must be supplied up front.
pub struct ManifestBuilder {
    manifest: Manifest,
}

impl ManifestBuilder {
    /// Start from system defaults with the given anchor.
    pub fn new(anchor: impl Into<String>) -> Self {
        let mut manifest = default_manifest(ManifestOverrides::default());
        manifest.anchor = anchor.into();
        Self { manifest }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.manifest.version = version.into();
        self
    }

    pub fn ethics_protocol(mut self, tag: impl Into<String>) -> Self {
        self.manifest.ethics_protocol = tag.into();
        self
    }

    /// Replace the tag list.
    pub fn srb_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.manifest.srb_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Append a tag.
    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.manifest.srb_tags.push(tag.into());
        self
    }

    pub fn dlp(mut self, dlp: Dlp) -> Self {
        self.manifest.dlp = dlp;
        self
    }

    pub fn classification(mut self, classification: Classification) -> Self {
        self.manifest.dlp.classification = Some(classification);
        self
    }

    pub fn context_tag(mut self, tag: impl Into<String>) -> Self {
        self.manifest.dlp.context_tag = Some(tag.into());
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.manifest.team = team.into();
        self
    }

    /// Pin the export time. Needed for reproducible digests.
    pub fn export_time(mut self, time: impl Into<String>) -> Self {
        self.manifest.export_time = time.into();
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.manifest
            .metadata
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }

    pub fn build(self) -> Manifest {
        self.manifest
    }
}
