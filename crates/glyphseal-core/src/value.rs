//! Value graphs: the artifact representation.
//!
//! An artifact is an arbitrary structured value that may contain cycles.
//! It is stored as an arena of [`Node`]s addressed by [`NodeId`] handles.
//! A handle is the identity of a composite node, so a graph can refer back
//! to an ancestor without any shared mutable references.
//!
//! Handles are only ever produced by the graph that owns them, and every
//! mutation checks that referenced handles exist. A graph therefore never
//! contains a dangling edge.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{CoreError, Result};

mod json;

pub use json::MAX_SERDE_DEPTH;

/// Rendered in place of a node that is already on the traversal path.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// A handle to a node inside a [`ValueGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Index of the node in its arena.
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An object key, coerced to text on construction.
///
/// Integer and boolean keys become their decimal / literal spelling, so
/// `1` and `"1"` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for Key {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Self(n.to_string())
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Self(b.to_string())
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self(c.to_string())
    }
}

/// A numeric scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    /// Integers above `i64::MAX`. Smaller values are always `Integer`.
    Unsigned(u64),
    Float(f64),
}

impl Number {
    /// The JSON number, or `null` for NaN and the infinities.
    pub fn to_json(self) -> serde_json::Value {
        match self {
            Number::Integer(n) => serde_json::Value::Number(n.into()),
            Number::Unsigned(n) => serde_json::Value::Number(n.into()),
            Number::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }

    fn from_json(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Integer(i)
        } else if let Some(u) = n.as_u64() {
            Number::Unsigned(u)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Integer(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Integer(n.into())
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::Integer(n.into())
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Number::Unsigned(n), Number::Integer)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

/// A single node in a value graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Ordered child handles.
    Array(Vec<NodeId>),
    /// Entries in insertion order. Keys are unique.
    Object(Vec<(Key, NodeId)>),
}

impl Node {
    /// Whether this node can hold children.
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    fn children(&self) -> Box<dyn Iterator<Item = NodeId> + '_> {
        match self {
            Node::Array(items) => Box::new(items.iter().copied()),
            Node::Object(entries) => Box::new(entries.iter().map(|(_, id)| *id)),
            _ => Box::new(std::iter::empty()),
        }
    }
}

/// An arena-backed value graph with a designated root.
#[derive(Debug, Clone)]
pub struct ValueGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ValueGraph {
    /// A graph whose root is `null`.
    pub fn null() -> Self {
        Self::with_root(Node::Null)
    }

    /// A graph whose root is an empty object.
    pub fn object() -> Self {
        Self::with_root(Node::Object(Vec::new()))
    }

    /// A graph whose root is an empty array.
    pub fn array() -> Self {
        Self::with_root(Node::Array(Vec::new()))
    }

    /// A graph whose root is a text node.
    pub fn text(s: impl Into<String>) -> Self {
        Self::with_root(Node::Text(s.into()))
    }

    fn with_root(node: Node) -> Self {
        Self {
            nodes: vec![node],
            root: NodeId(0),
        }
    }

    /// The root handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena (including unreachable ones).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn add_null(&mut self) -> NodeId {
        self.alloc(Node::Null)
    }

    pub fn add_bool(&mut self, b: bool) -> NodeId {
        self.alloc(Node::Bool(b))
    }

    pub fn add_number(&mut self, n: impl Into<Number>) -> NodeId {
        self.alloc(Node::Number(n.into()))
    }

    pub fn add_text(&mut self, s: impl Into<String>) -> NodeId {
        self.alloc(Node::Text(s.into()))
    }

    /// Add an empty array node.
    pub fn add_array(&mut self) -> NodeId {
        self.alloc(Node::Array(Vec::new()))
    }

    /// Add an empty object node.
    pub fn add_object(&mut self) -> NodeId {
        self.alloc(Node::Object(Vec::new()))
    }

    /// Append `child` to the array at `array`.
    pub fn push(&mut self, array: NodeId, child: NodeId) -> Result<()> {
        self.check(child)?;
        match self.nodes.get_mut(array.0) {
            Some(Node::Array(items)) => {
                items.push(child);
                Ok(())
            }
            Some(_) => Err(CoreError::NotAnArray(array)),
            None => Err(CoreError::UnknownNode(array)),
        }
    }

    /// Set `key` on the object at `object`, replacing any existing entry.
    pub fn insert(&mut self, object: NodeId, key: impl Into<Key>, child: NodeId) -> Result<()> {
        self.check(child)?;
        let key = key.into();
        match self.nodes.get_mut(object.0) {
            Some(Node::Object(entries)) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = child,
                    None => entries.push((key, child)),
                }
                Ok(())
            }
            Some(_) => Err(CoreError::NotAnObject(object)),
            None => Err(CoreError::UnknownNode(object)),
        }
    }

    /// Remove `key` from the object at `object`, returning the detached handle.
    pub fn remove(&mut self, object: NodeId, key: &str) -> Result<Option<NodeId>> {
        match self.nodes.get_mut(object.0) {
            Some(Node::Object(entries)) => {
                let pos = entries.iter().position(|(k, _)| k.as_str() == key);
                Ok(pos.map(|i| entries.remove(i).1))
            }
            Some(_) => Err(CoreError::NotAnObject(object)),
            None => Err(CoreError::UnknownNode(object)),
        }
    }

    /// Replace the contents of an existing node.
    ///
    /// An object node must not repeat a key; keys compare by their text, so
    /// `1` and `"1"` collide.
    pub fn set(&mut self, id: NodeId, node: Node) -> Result<()> {
        for child in node.children() {
            self.check(child)?;
        }
        if let Node::Object(entries) = &node {
            let mut seen = HashSet::with_capacity(entries.len());
            if let Some((key, _)) = entries.iter().find(|(k, _)| !seen.insert(k.as_str())) {
                return Err(CoreError::DuplicateKey(key.to_string()));
            }
        }
        match self.nodes.get_mut(id.0) {
            Some(slot) => {
                *slot = node;
                Ok(())
            }
            None => Err(CoreError::UnknownNode(id)),
        }
    }

    /// Look up the child stored under `key` in the object at `object`.
    pub fn get(&self, object: NodeId, key: &str) -> Option<NodeId> {
        match self.node(object)? {
            Node::Object(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, id)| *id),
            _ => None,
        }
    }

    /// Copy every node of `other` into this arena.
    ///
    /// Returns the handle of `other`'s root inside `self`. Edges inside the
    /// copied region are remapped, so cycles in `other` survive the graft.
    pub fn graft(&mut self, other: &ValueGraph) -> NodeId {
        let offset = self.nodes.len();
        let shift = |id: &NodeId| NodeId(id.0 + offset);
        self.nodes.extend(other.nodes.iter().map(|node| match node {
            Node::Array(items) => Node::Array(items.iter().map(shift).collect()),
            Node::Object(entries) => {
                Node::Object(entries.iter().map(|(k, id)| (k.clone(), shift(id))).collect())
            }
            scalar => scalar.clone(),
        }));
        shift(&other.root)
    }

    /// A compact copy of the nodes reachable from `start`, rooted there.
    ///
    /// Sharing and cycles inside the reachable region are preserved. An
    /// unknown `start` yields a `null` graph.
    pub fn subgraph(&self, start: NodeId) -> ValueGraph {
        if self.node(start).is_none() {
            return ValueGraph::null();
        }
        let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if remap.contains_key(&id) {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };
            remap.insert(id, NodeId(order.len()));
            order.push(node);
            stack.extend(node.children());
        }

        let moved = |id: &NodeId| remap.get(id).copied();
        let nodes = order
            .into_iter()
            .map(|node| match node {
                Node::Array(items) => Node::Array(items.iter().filter_map(moved).collect()),
                Node::Object(entries) => Node::Object(
                    entries
                        .iter()
                        .filter_map(|(k, id)| moved(id).map(|id| (k.clone(), id)))
                        .collect(),
                ),
                scalar => scalar.clone(),
            })
            .collect();
        ValueGraph {
            nodes,
            root: NodeId(0),
        }
    }

    /// Whether any cycle is reachable from the root.
    pub fn has_cycle(&self) -> bool {
        let Some(root) = self.node(self.root) else {
            return false;
        };
        let mut on_path = HashSet::from([self.root]);
        let mut done = HashSet::new();
        let mut stack = vec![(self.root, root.children())];

        while let Some(top) = stack.last_mut() {
            let Some(child) = top.1.next() else {
                let id = top.0;
                stack.pop();
                on_path.remove(&id);
                done.insert(id);
                continue;
            };
            if on_path.contains(&child) {
                return true;
            }
            if done.contains(&child) {
                continue;
            }
            if let Some(node) = self.node(child) {
                on_path.insert(child);
                stack.push((child, node.children()));
            }
        }
        false
    }

    /// Number of nodes on the longest path from the root that does not
    /// revisit a node. A scalar root has depth 1.
    pub fn depth(&self) -> usize {
        let Some(root) = self.node(self.root) else {
            return 0;
        };
        let mut memo: HashMap<NodeId, usize> = HashMap::new();
        let mut on_path = HashSet::from([self.root]);
        // (node, remaining children, deepest child seen so far)
        let mut stack = vec![(self.root, root.children(), 0usize)];

        while let Some(top) = stack.last_mut() {
            let Some(child) = top.1.next() else {
                let Some((id, _, deepest)) = stack.pop() else {
                    break;
                };
                let depth = deepest + 1;
                memo.insert(id, depth);
                on_path.remove(&id);
                match stack.last_mut() {
                    Some(parent) => parent.2 = parent.2.max(depth),
                    None => return depth,
                }
                continue;
            };
            if on_path.contains(&child) {
                continue;
            }
            if let Some(depth) = memo.get(&child) {
                top.2 = top.2.max(*depth);
            } else if let Some(node) = self.node(child) {
                on_path.insert(child);
                stack.push((child, node.children(), 0));
            }
        }
        0
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(CoreError::UnknownNode(id))
        }
    }
}

impl From<serde_json::Value> for ValueGraph {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(&value)
    }
}

impl From<&serde_json::Value> for ValueGraph {
    fn from(value: &serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

impl From<String> for ValueGraph {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<&str> for ValueGraph {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}
