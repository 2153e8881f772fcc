//! JSON conversion for value graphs.
//!
//! Conversion to and from `serde_json::Value`, the text writer, and the text
//! reader all run on explicit work stacks, so nesting depth is bounded by
//! memory rather than by the call stack. The serde impls are the exception:
//! serde recurses per level, so they refuse graphs nested deeper than
//! [`MAX_SERDE_DEPTH`].

use std::collections::HashSet;
use std::io;

use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::Value as Json;

use super::{Key, Node, NodeId, Number, ValueGraph, CIRCULAR_MARKER};
use crate::error::{CoreError, Result};

/// Deepest graph the serde impls accept, the same limit serde_json applies
/// when parsing text.
pub const MAX_SERDE_DEPTH: usize = 128;

enum ToFrame<'a> {
    Array {
        id: NodeId,
        items: std::slice::Iter<'a, NodeId>,
        out: Vec<Json>,
    },
    Object {
        id: NodeId,
        entries: std::slice::Iter<'a, (Key, NodeId)>,
        key: Option<&'a Key>,
        out: serde_json::Map<String, Json>,
    },
}

enum FromFrame<'a> {
    Array {
        items: std::slice::Iter<'a, Json>,
        out: Vec<NodeId>,
    },
    Object {
        entries: serde_json::map::Iter<'a>,
        key: Option<&'a String>,
        out: Vec<(Key, NodeId)>,
    },
}

enum WriteStep<'a> {
    Visit(NodeId),
    BeginArrayValue(bool),
    EndArrayValue,
    Key(&'a Key, bool),
    EndObjectValue,
    EndArray(NodeId),
    EndObject(NodeId),
}

/// A container still waiting for children while parsing.
enum Open {
    Array(NodeId),
    Object(NodeId, String),
}

impl ValueGraph {
    /// Convert to a JSON value.
    ///
    /// JSON cannot express cycles or non-finite numbers: a back-edge becomes
    /// the string `"[Circular]"` and NaN/Infinity become `null`.
    ///
    /// `serde_json::Value` drops recursively, so very deep graphs should be
    /// streamed with [`ValueGraph::write_json`] instead.
    pub fn to_json(&self) -> Json {
        let mut on_path = HashSet::new();
        let mut stack = Vec::new();
        let mut finished = self.open_json(self.root, &mut on_path, &mut stack);

        loop {
            let Some(frame) = stack.last_mut() else {
                return finished.unwrap_or(Json::Null);
            };
            let next = match frame {
                ToFrame::Array { items, out, .. } => {
                    out.extend(finished.take());
                    items.next().copied()
                }
                ToFrame::Object {
                    entries, key, out, ..
                } => {
                    if let (Some(k), Some(v)) = (key.take(), finished.take()) {
                        out.insert(k.as_str().to_string(), v);
                    }
                    entries.next().map(|(k, id)| {
                        *key = Some(k);
                        *id
                    })
                }
            };
            finished = match next {
                Some(child) => self.open_json(child, &mut on_path, &mut stack),
                None => stack.pop().map(|frame| match frame {
                    ToFrame::Array { id, out, .. } => {
                        on_path.remove(&id);
                        Json::Array(out)
                    }
                    ToFrame::Object { id, out, .. } => {
                        on_path.remove(&id);
                        Json::Object(out)
                    }
                }),
            };
        }
    }

    /// Scalars convert immediately; containers push a frame and yield `None`.
    fn open_json<'a>(
        &'a self,
        id: NodeId,
        on_path: &mut HashSet<NodeId>,
        stack: &mut Vec<ToFrame<'a>>,
    ) -> Option<Json> {
        let Some(node) = self.node(id) else {
            return Some(Json::Null);
        };
        if node.is_composite() && !on_path.insert(id) {
            return Some(Json::String(CIRCULAR_MARKER.to_string()));
        }
        match node {
            Node::Null => Some(Json::Null),
            Node::Bool(b) => Some(Json::Bool(*b)),
            Node::Number(n) => Some(n.to_json()),
            Node::Text(s) => Some(Json::String(s.clone())),
            Node::Array(items) => {
                stack.push(ToFrame::Array {
                    id,
                    items: items.iter(),
                    out: Vec::with_capacity(items.len()),
                });
                None
            }
            Node::Object(entries) => {
                stack.push(ToFrame::Object {
                    id,
                    entries: entries.iter(),
                    key: None,
                    out: serde_json::Map::new(),
                });
                None
            }
        }
    }

    /// Build a graph from a JSON value.
    pub fn from_json(value: &Json) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let mut stack = Vec::new();
        let mut finished = graph.open_value(value, &mut stack);

        while let Some(frame) = stack.last_mut() {
            let next = match frame {
                FromFrame::Array { items, out } => {
                    out.extend(finished.take());
                    items.next()
                }
                FromFrame::Object { entries, key, out } => {
                    if let (Some(k), Some(id)) = (key.take(), finished.take()) {
                        out.push((Key::from(k.as_str()), id));
                    }
                    entries.next().map(|(k, v)| {
                        *key = Some(k);
                        v
                    })
                }
            };
            finished = match next {
                Some(child) => graph.open_value(child, &mut stack),
                None => stack.pop().map(|frame| match frame {
                    FromFrame::Array { out, .. } => graph.alloc(Node::Array(out)),
                    FromFrame::Object { out, .. } => graph.alloc(Node::Object(out)),
                }),
            };
        }

        graph.root = match finished {
            Some(root) => root,
            None => graph.add_null(),
        };
        graph
    }

    fn open_value<'a>(&mut self, value: &'a Json, stack: &mut Vec<FromFrame<'a>>) -> Option<NodeId> {
        match value {
            Json::Null => Some(self.add_null()),
            Json::Bool(b) => Some(self.add_bool(*b)),
            Json::Number(n) => Some(self.add_number(Number::from_json(n))),
            Json::String(s) => Some(self.add_text(s.as_str())),
            Json::Array(items) => {
                stack.push(FromFrame::Array {
                    items: items.iter(),
                    out: Vec::with_capacity(items.len()),
                });
                None
            }
            Json::Object(map) => {
                stack.push(FromFrame::Object {
                    entries: map.iter(),
                    key: None,
                    out: Vec::with_capacity(map.len()),
                });
                None
            }
        }
    }

    /// Write compact JSON text.
    ///
    /// Same mapping as [`ValueGraph::to_json`], but object entries keep
    /// insertion order and nothing is buffered.
    pub fn write_json<W: io::Write>(&self, writer: W) -> io::Result<()> {
        self.write_json_with(writer, &mut CompactFormatter)
    }

    /// Write indented JSON text.
    pub fn write_json_pretty<W: io::Write>(&self, writer: W) -> io::Result<()> {
        self.write_json_with(writer, &mut PrettyFormatter::new())
    }

    fn write_json_with<W: io::Write, F: Formatter>(
        &self,
        mut writer: W,
        f: &mut F,
    ) -> io::Result<()> {
        let mut on_path = HashSet::new();
        let mut stack = vec![WriteStep::Visit(self.root)];

        while let Some(step) = stack.pop() {
            match step {
                WriteStep::Visit(id) => {
                    let Some(node) = self.node(id) else {
                        f.write_null(&mut writer)?;
                        continue;
                    };
                    if node.is_composite() && on_path.contains(&id) {
                        serde_json::to_writer(&mut writer, CIRCULAR_MARKER)?;
                        continue;
                    }
                    match node {
                        Node::Null => f.write_null(&mut writer)?,
                        Node::Bool(b) => f.write_bool(&mut writer, *b)?,
                        Node::Number(Number::Integer(n)) => f.write_i64(&mut writer, *n)?,
                        Node::Number(Number::Unsigned(n)) => f.write_u64(&mut writer, *n)?,
                        Node::Number(Number::Float(x)) if x.is_finite() => {
                            f.write_f64(&mut writer, *x)?
                        }
                        Node::Number(Number::Float(_)) => f.write_null(&mut writer)?,
                        Node::Text(s) => serde_json::to_writer(&mut writer, s)?,
                        Node::Array(items) => {
                            on_path.insert(id);
                            f.begin_array(&mut writer)?;
                            stack.push(WriteStep::EndArray(id));
                            for (i, child) in items.iter().enumerate().rev() {
                                stack.push(WriteStep::EndArrayValue);
                                stack.push(WriteStep::Visit(*child));
                                stack.push(WriteStep::BeginArrayValue(i == 0));
                            }
                        }
                        Node::Object(entries) => {
                            on_path.insert(id);
                            f.begin_object(&mut writer)?;
                            stack.push(WriteStep::EndObject(id));
                            for (i, (key, child)) in entries.iter().enumerate().rev() {
                                stack.push(WriteStep::EndObjectValue);
                                stack.push(WriteStep::Visit(*child));
                                stack.push(WriteStep::Key(key, i == 0));
                            }
                        }
                    }
                }
                WriteStep::BeginArrayValue(first) => f.begin_array_value(&mut writer, first)?,
                WriteStep::EndArrayValue => f.end_array_value(&mut writer)?,
                WriteStep::Key(key, first) => {
                    f.begin_object_key(&mut writer, first)?;
                    serde_json::to_writer(&mut writer, key.as_str())?;
                    f.end_object_key(&mut writer)?;
                    f.begin_object_value(&mut writer)?;
                }
                WriteStep::EndObjectValue => f.end_object_value(&mut writer)?,
                WriteStep::EndArray(id) => {
                    on_path.remove(&id);
                    f.end_array(&mut writer)?;
                }
                WriteStep::EndObject(id) => {
                    on_path.remove(&id);
                    f.end_object(&mut writer)?;
                }
            }
        }
        Ok(())
    }

    /// Parse JSON text into a graph.
    ///
    /// Strings and numbers are decoded by serde_json; only the nesting is
    /// handled here. A repeated object key keeps its first position and its
    /// last value.
    pub fn parse_json(text: &str) -> Result<Self> {
        let mut p = Parser { text, pos: 0 };
        let mut graph = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let mut stack: Vec<Open> = Vec::new();

        loop {
            let mut done = match p.next_token() {
                Some(b'[') => {
                    let id = graph.add_array();
                    if p.peek_token() == Some(b']') {
                        p.pos += 1;
                        id
                    } else {
                        stack.push(Open::Array(id));
                        continue;
                    }
                }
                Some(b'{') => {
                    let id = graph.add_object();
                    if p.peek_token() == Some(b'}') {
                        p.pos += 1;
                        id
                    } else {
                        let key = p.key()?;
                        stack.push(Open::Object(id, key));
                        continue;
                    }
                }
                Some(b'"') => {
                    let s = p.string()?;
                    graph.add_text(s)
                }
                Some(b't') => {
                    p.literal("true")?;
                    graph.add_bool(true)
                }
                Some(b'f') => {
                    p.literal("false")?;
                    graph.add_bool(false)
                }
                Some(b'n') => {
                    p.literal("null")?;
                    graph.add_null()
                }
                Some(b'-' | b'0'..=b'9') => {
                    let n = p.number()?;
                    graph.add_number(n)
                }
                _ => return Err(p.error("expected a value")),
            };

            // Attach the finished value, closing every container that ends here.
            loop {
                match stack.last_mut() {
                    None => {
                        if p.next_token().is_some() {
                            return Err(p.error("trailing characters"));
                        }
                        graph.root = done;
                        return Ok(graph);
                    }
                    Some(Open::Array(array)) => {
                        let array = *array;
                        graph.push(array, done)?;
                        match p.next_token() {
                            Some(b',') => break,
                            Some(b']') => {
                                stack.pop();
                                done = array;
                            }
                            _ => return Err(p.error("expected ',' or ']'")),
                        }
                    }
                    Some(Open::Object(object, key)) => {
                        let object = *object;
                        graph.insert(object, std::mem::take(key), done)?;
                        match p.next_token() {
                            Some(b',') => {
                                *key = p.key()?;
                                break;
                            }
                            Some(b'}') => {
                                stack.pop();
                                done = object;
                            }
                            _ => return Err(p.error("expected ',' or '}'")),
                        }
                    }
                }
            }
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, msg: &str) -> CoreError {
        CoreError::DecodingError(format!("{} at byte {}", msg, self.pos))
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn peek_token(&mut self) -> Option<u8> {
        self.skip_ws();
        self.peek()
    }

    /// Consume the next non-whitespace byte.
    fn next_token(&mut self) -> Option<u8> {
        let b = self.peek_token();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn key(&mut self) -> Result<String> {
        if self.next_token() != Some(b'"') {
            return Err(self.error("expected a string key"));
        }
        let key = self.string()?;
        if self.next_token() != Some(b':') {
            return Err(self.error("expected ':'"));
        }
        Ok(key)
    }

    /// A string literal whose opening quote was just consumed.
    fn string(&mut self) -> Result<String> {
        let start = self.pos - 1;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        serde_json::from_str(&self.text[start..self.pos]).map_err(|e| self.error(&e.to_string()))
    }

    /// A number whose first byte was just consumed.
    fn number(&mut self) -> Result<Number> {
        let start = self.pos - 1;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }
        let n: serde_json::Number = serde_json::from_str(&self.text[start..self.pos])
            .map_err(|e| self.error(&e.to_string()))?;
        Ok(Number::from_json(&n))
    }

    /// A literal whose first byte was just consumed.
    fn literal(&mut self, word: &str) -> Result<()> {
        let start = self.pos - 1;
        if self.text.as_bytes()[start..].starts_with(word.as_bytes()) {
            self.pos = start + word.len();
            Ok(())
        } else {
            Err(self.error("invalid literal"))
        }
    }
}

impl Serialize for ValueGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.depth() > MAX_SERDE_DEPTH {
            return Err(ser::Error::custom(format_args!(
                "value graph nested deeper than {} levels",
                MAX_SERDE_DEPTH
            )));
        }
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValueGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Json::deserialize(deserializer).map(|v| Self::from_json(&v))
    }
}
