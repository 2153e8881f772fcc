//! Canonical text encoding for deterministic hashing.
//!
//! The encoding is a JSON-like text with these rules:
//! - Object entries sorted by key bytes (lexicographic)
//! - Array elements kept in order
//! - Strings as JSON string literals with a fixed escape set
//! - Integral floats rendered as integers, `-0.0` as `0`
//! - Non-finite floats rendered as the bare sentinels `NaN`, `Infinity`, `-Infinity`
//! - A node already on the traversal path rendered as the bare sentinel `[Circular]`
//! - No whitespace
//!
//! Bare sentinels can never be produced by a string value, since strings are
//! always quoted. Shared subgraphs that are not cycles render in full at every
//! occurrence, so output depends only on the shape of the value.
//!
//! The traversal uses an explicit work stack, so arbitrarily deep graphs
//! cannot overflow the call stack.
//!
//! **CRITICAL**: seals are digests of this encoding. Changes break every
//! existing seal.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::value::{Node, NodeId, Number, ValueGraph, CIRCULAR_MARKER};

/// Sentinels for non-finite floats.
mod sentinels {
    pub const NAN: &str = "NaN";
    pub const POS_INFINITY: &str = "Infinity";
    pub const NEG_INFINITY: &str = "-Infinity";
}

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A unit of pending work.
enum Step<'a> {
    Visit(NodeId),
    Emit(Cow<'a, str>),
    Leave(NodeId),
}

/// Canonicalize a value graph starting at its root.
pub fn canonicalize(graph: &ValueGraph) -> String {
    canonicalize_from(graph, graph.root())
}

/// Canonicalize the subgraph reachable from `start`.
///
/// A handle that does not belong to `graph` renders as `null`.
pub fn canonicalize_from(graph: &ValueGraph, start: NodeId) -> String {
    let mut out = String::new();
    let mut visiting: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![Step::Visit(start)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Emit(text) => out.push_str(&text),
            Step::Leave(id) => {
                visiting.remove(&id);
            }
            Step::Visit(id) => {
                let Some(node) = graph.node(id) else {
                    out.push_str("null");
                    continue;
                };
                match node {
                    Node::Null => out.push_str("null"),
                    Node::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                    Node::Number(n) => encode_number(&mut out, *n),
                    Node::Text(s) => encode_text(&mut out, s),
                    Node::Array(_) | Node::Object(_) if visiting.contains(&id) => {
                        out.push_str(CIRCULAR_MARKER);
                    }
                    Node::Array(items) => {
                        visiting.insert(id);
                        out.push('[');
                        // Pushed in reverse so they pop in order.
                        stack.push(Step::Leave(id));
                        stack.push(Step::Emit(Cow::Borrowed("]")));
                        for (i, child) in items.iter().enumerate().rev() {
                            stack.push(Step::Visit(*child));
                            if i > 0 {
                                stack.push(Step::Emit(Cow::Borrowed(",")));
                            }
                        }
                    }
                    Node::Object(entries) => {
                        visiting.insert(id);
                        out.push('{');
                        let mut sorted: Vec<_> = entries.iter().collect();
                        sorted.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

                        stack.push(Step::Leave(id));
                        stack.push(Step::Emit(Cow::Borrowed("}")));
                        for (i, (key, child)) in sorted.into_iter().enumerate().rev() {
                            stack.push(Step::Visit(*child));
                            let mut prefix = String::with_capacity(key.as_str().len() + 4);
                            if i > 0 {
                                prefix.push(',');
                            }
                            encode_text(&mut prefix, key.as_str());
                            prefix.push(':');
                            stack.push(Step::Emit(Cow::Owned(prefix)));
                        }
                    }
                }
            }
        }
    }

    out
}

/// Encode a number.
fn encode_number(out: &mut String, n: Number) {
    match n {
        Number::Integer(i) => out.push_str(&i.to_string()),
        Number::Unsigned(u) => out.push_str(&u.to_string()),
        Number::Float(f) if f.is_nan() => out.push_str(sentinels::NAN),
        Number::Float(f) if f.is_infinite() => out.push_str(if f > 0.0 {
            sentinels::POS_INFINITY
        } else {
            sentinels::NEG_INFINITY
        }),
        Number::Float(f) if f == 0.0 => out.push('0'),
        Number::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            out.push_str(&(f as i64).to_string());
        }
        // Display for f64 is the shortest round-trip form, never exponential.
        Number::Float(f) => out.push_str(&f.to_string()),
    }
}

/// Encode a string as a quoted literal.
///
/// Escapes `"`, `\` and all control characters; everything else is copied
/// through as UTF-8.
fn encode_text(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
