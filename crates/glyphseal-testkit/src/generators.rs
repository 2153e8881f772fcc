//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value as Json};

use glyphseal_core::registry::{anchors, tags};
use glyphseal_core::{Classification, Dlp, Manifest, ManifestBuilder, NodeId, ValueGraph};
use glyphseal_guard::Policy;

/// Generate an object key.
pub fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,11}".prop_map(String::from)
}

/// Generate a finite float.
pub fn finite_float() -> impl Strategy<Value = f64> {
    -1.0e9f64..1.0e9f64
}

/// Generate a JSON scalar.
pub fn json_leaf() -> impl Strategy<Value = Json> {
    prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i64>().prop_map(Json::from),
        finite_float().prop_map(Json::from),
        "\\PC{0,16}".prop_map(Json::String),
    ]
}

/// Generate an arbitrary JSON value, up to a few levels deep.
pub fn json_value() -> impl Strategy<Value = Json> {
    json_leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::btree_map(key(), inner, 0..6)
                .prop_map(|m| Json::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate an acyclic value graph.
pub fn value_graph() -> impl Strategy<Value = ValueGraph> {
    json_value().prop_map(ValueGraph::from)
}

/// Build a graph from `value`, inserting every object's keys in reverse order.
///
/// Structurally equal to `ValueGraph::from(value)` but built differently, for
/// insertion-order properties.
pub fn graph_reversed(value: &Json) -> ValueGraph {
    let mut g = match value {
        Json::Array(_) => ValueGraph::array(),
        Json::Object(_) => ValueGraph::object(),
        scalar => return ValueGraph::from(scalar),
    };
    let root = g.root();
    fill_reversed(&mut g, root, value);
    g
}

fn fill_reversed(g: &mut ValueGraph, id: NodeId, value: &Json) {
    match value {
        Json::Array(items) => {
            for item in items {
                let child = add_reversed(g, item);
                let _ = g.push(id, child);
            }
        }
        Json::Object(map) => {
            for (k, v) in map.iter().rev() {
                let child = add_reversed(g, v);
                let _ = g.insert(id, k.as_str(), child);
            }
        }
        _ => {}
    }
}

fn add_reversed(g: &mut ValueGraph, value: &Json) -> NodeId {
    let id = match value {
        Json::Array(_) => g.add_array(),
        Json::Object(_) => g.add_object(),
        scalar => return g.graft(&ValueGraph::from(scalar)),
    };
    fill_reversed(g, id, value);
    id
}

/// Generate a classification.
pub fn classification() -> impl Strategy<Value = Classification> {
    prop_oneof![
        Just(Classification::Open),
        Just(Classification::Internal),
        Just(Classification::Restricted),
        Just(Classification::Confidential),
    ]
}

/// Generate a policy.
pub fn policy() -> impl Strategy<Value = Policy> {
    prop_oneof![Just(Policy::Off), Just(Policy::Warn), Just(Policy::Strict)]
}

/// Generate an anchor from the registry.
pub fn anchor() -> impl Strategy<Value = &'static str> {
    prop::sample::select(anchors::ALL.to_vec())
}

/// Generate a complete manifest with a pinned export time.
pub fn manifest() -> impl Strategy<Value = Manifest> {
    (
        anchor(),
        classification(),
        "[a-z][a-z0-9-]{0,15}",
        prop::sample::subsequence(tags::ALL.to_vec(), 0..=tags::ALL.len()),
        prop::option::of("\\PC{1,24}"),
    )
        .prop_map(|(anchor, classification, context_tag, tags, note)| {
            let mut dlp = Dlp::new(classification, context_tag);
            if let Some(note) = note {
                dlp = dlp.with_note(note);
            }
            ManifestBuilder::new(anchor)
                .srb_tags(tags)
                .dlp(dlp)
                .export_time("2026-01-14T12:00:00.000Z")
                .build()
        })
}
