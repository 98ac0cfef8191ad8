//! Deep get/set over value trees addressed by dot/bracket paths
//!
//! `set_in` is copy-on-write: only the containers along the path are cloned,
//! every sibling subtree keeps its allocation, and a write that changes nothing
//! hands back the original root.

use super::value::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A parsed field path such as `address.lines[1]`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse dot and bracket notation: `a.b[0]["c"]` -> `a`, `b`, `0`, `c`
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => flush(&mut current, &mut segments),
                '[' => {
                    flush(&mut current, &mut segments);
                    let mut inner = String::new();
                    for c in chars.by_ref() {
                        if c == ']' {
                            break;
                        }
                        inner.push(c);
                    }
                    let inner = inner.trim();
                    let inner = inner
                        .strip_prefix(['"', '\''])
                        .and_then(|s| s.strip_suffix(['"', '\'']))
                        .unwrap_or(inner);
                    if !inner.is_empty() {
                        segments.push(inner.to_string());
                    }
                }
                c => current.push(c),
            }
        }
        flush(&mut current, &mut segments);

        FieldPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }
}

fn flush(current: &mut String, segments: &mut Vec<String>) {
    if !current.is_empty() {
        segments.push(std::mem::take(current));
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if as_index(segment).is_some() {
                write!(f, "[{segment}]")?;
            } else if i == 0 {
                write!(f, "{segment}")?;
            } else {
                write!(f, ".{segment}")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::parse(path)
    }
}

/// Largest segment treated as an array index; bigger numbers are plain keys
pub const MAX_ARRAY_INDEX: usize = 1 << 16;

/// Canonical non-negative integer segment (`"01"` is a key, not an index)
fn as_index(segment: &str) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|n| *n <= MAX_ARRAY_INDEX && n.to_string() == segment)
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => as_index(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Look up the value at `path`, or `None` if any step is missing
pub fn lookup<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    FieldPath::parse(path)
        .segments()
        .iter()
        .try_fold(obj, |node, segment| child(node, segment))
}

/// Value at `path`, falling back to `default` when the path is missing
pub fn get_in<'a>(obj: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    lookup(obj, path).unwrap_or(default)
}

/// Return a new tree with `value` installed at `path`
///
/// `None` deletes the key. If nothing changes the original root is returned.
pub fn set_in(obj: &Value, path: &str, value: impl Into<Option<Value>>) -> Value {
    let path = FieldPath::parse(path);
    let value = value.into();
    assign(obj, path.segments(), value.as_ref()).unwrap_or_else(|| obj.clone())
}

/// Return a new tree without the key at `path`
pub fn delete_in(obj: &Value, path: &str) -> Value {
    set_in(obj, path, None)
}

/// Returns `None` when the write leaves `node` unchanged.
fn assign(node: &Value, segments: &[String], value: Option<&Value>) -> Option<Value> {
    let (head, rest) = segments.split_first()?;
    let current = child(node, head);

    let replacement = if rest.is_empty() {
        match (current, value) {
            (Some(existing), Some(new)) if existing == new => return None,
            (None, None) => return None,
            (_, new) => new.cloned(),
        }
    } else {
        let base = match current {
            Some(existing) if existing.is_container() => existing.clone(),
            _ => empty_container_for(&rest[0]),
        };
        Some(assign(&base, rest, value)?)
    };

    match node {
        Value::Array(items) => {
            let index = as_index(head)?;
            let mut items = Vec::clone(items);
            match replacement {
                Some(new) => {
                    if index >= items.len() {
                        items.resize(index + 1, Value::Null);
                    }
                    items[index] = new;
                }
                None => items[index] = Value::Null,
            }
            Some(Value::Array(Arc::new(items)))
        }
        Value::Object(map) => Some(Value::Object(Arc::new(with_key(
            Map::clone(map),
            head,
            replacement,
        )))),
        _ => Some(Value::Object(Arc::new(with_key(
            Map::new(),
            head,
            replacement,
        )))),
    }
}

fn with_key(mut map: Map, key: &str, value: Option<Value>) -> Map {
    match value {
        Some(value) => {
            map.insert(key.to_string(), value);
        }
        None => {
            map.remove(key);
        }
    }
    map
}

fn empty_container_for(next_segment: &str) -> Value {
    if as_index(next_segment).is_some() {
        Value::array()
    } else {
        Value::object()
    }
}

/// Strip one trailing array index: `items[1]` -> `items`
pub fn normalize_error_path(path: &str) -> &str {
    let Some(body) = path.strip_suffix(']') else {
        return path;
    };
    let Some(open) = body.rfind('[') else {
        return path;
    };
    let (prefix, digits) = (&body[..open], &body[open + 1..]);
    if prefix.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return path;
    }
    prefix
}

/// Every leaf path in the tree, in dot/bracket form
///
/// Empty containers have no leaves and are skipped.
pub fn leaf_paths(obj: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_leaves(obj, &mut FieldPath::default(), &mut out);
    out
}

fn collect_leaves(node: &Value, prefix: &mut FieldPath, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map.iter() {
                prefix.push(key.clone());
                collect_leaves(child, prefix, out);
                prefix.0.pop();
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                prefix.push(i.to_string());
                collect_leaves(child, prefix, out);
                prefix.0.pop();
            }
        }
        _ if !prefix.is_empty() => out.push(prefix.to_string()),
        _ => {}
    }
}
