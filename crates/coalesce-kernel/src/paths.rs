//! TreeWalker: path extraction and path resolution over arbitrary trees.
//!
//! A path is a dot-separated list of record keys with `[i]` suffixes for
//! sequence indices, e.g. `scores.breakdown[0].label`.
//!
//! Extraction only expands element `[0]` of every sequence. Later elements
//! are never walked, so a field that only appears in `items[3]` has no path.
//! Completeness verification depends on this shape, so it is kept as-is.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Default depth bound for schema reporting.
pub const SCHEMA_MAX_DEPTH: usize = 5;

/// Default depth bound for completeness verification.
pub const VERIFY_MAX_DEPTH: usize = 10;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Inferred type of the value found at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Object,
    /// Sequence, tagged with the type of its first element (`None` if empty).
    Array(Option<Box<TypeTag>>),
    String,
    Integer,
    Float,
    Boolean,
    Null,
    /// The path did not resolve.
    Unknown,
}

impl TypeTag {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => TypeTag::Object,
            Value::Array(items) => TypeTag::Array(items.first().map(|v| Box::new(TypeTag::of(v)))),
            Value::String(_) => TypeTag::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => TypeTag::Integer,
            Value::Number(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Null => TypeTag::Null,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Object => write!(f, "object"),
            TypeTag::Array(Some(elem)) => write!(f, "array[{elem}]"),
            TypeTag::Array(None) => write!(f, "array[empty]"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Integer => write!(f, "integer"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::Null => write!(f, "null"),
            TypeTag::Unknown => write!(f, "unknown"),
        }
    }
}

/// Every path reachable in `tree`, bounded by `max_depth` levels.
///
/// Records emit one path per key and recurse into each value. Sequences
/// recurse into their first element under the synthetic `[0]` suffix; the
/// `[0]` path itself is not emitted. Scalars, empty containers, and an
/// exhausted depth end the branch.
pub fn extract_paths(tree: &Value, prefix: &str, max_depth: usize) -> BTreeSet<String> {
    extract_path_values(tree, prefix, max_depth)
        .into_keys()
        .collect()
}

/// Same walk as [`extract_paths`], keeping the value found at each path.
///
/// Keys may contain `.` or `[`, so a path string does not always parse back
/// to the segments that produced it. Callers that need the value at a path
/// should look it up here rather than through [`resolve_path`].
pub fn extract_path_values<'a>(
    tree: &'a Value,
    prefix: &str,
    max_depth: usize,
) -> BTreeMap<String, &'a Value> {
    let mut out = BTreeMap::new();
    walk(tree, prefix, prefix.is_empty(), max_depth, &mut out);
    out
}

fn walk<'a>(
    value: &'a Value,
    prefix: &str,
    at_root: bool,
    depth: usize,
    out: &mut BTreeMap<String, &'a Value>,
) {
    if depth == 0 {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                // An empty key below the root still contributes a `.`, so
                // `{"": {"x": 1}}` yields `""` and `.x` rather than `x`.
                let path = if at_root {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                walk(child, &path, false, depth - 1, out);
                out.insert(path, child);
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                walk(first, &format!("{prefix}[0]"), false, depth - 1, out);
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

/// Append a record key to a path prefix.
pub fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Split a path into key and index segments.
///
/// A dot-separated part whose bracket suffix is not a run of `[<digits>]`
/// is kept whole as a key.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    if path.is_empty() {
        return segments;
    }
    for part in path.split('.') {
        parse_part(part, &mut segments);
    }
    segments
}

fn parse_part(part: &str, out: &mut Vec<PathSegment>) {
    let Some(open) = part.find('[') else {
        out.push(PathSegment::Key(part.to_string()));
        return;
    };
    let (name, mut rest) = part.split_at(open);
    let mut indices = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        let Ok(index) = inner[..close].parse::<usize>() else {
            break;
        };
        indices.push(index);
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        out.push(PathSegment::Key(part.to_string()));
        return;
    }
    if !name.is_empty() {
        out.push(PathSegment::Key(name.to_string()));
    }
    out.extend(indices.into_iter().map(PathSegment::Index));
}

/// Walk `path` inside `tree`; `None` when any step does not resolve.
pub fn resolve_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    parse_path(path)
        .iter()
        .try_fold(tree, |current, segment| match segment {
            PathSegment::Key(key) => current.as_object()?.get(key),
            PathSegment::Index(index) => current.as_array()?.get(*index),
        })
}

/// Type of the value at `path`, or [`TypeTag::Unknown`] if it does not resolve.
pub fn type_at_path(tree: &Value, path: &str) -> TypeTag {
    resolve_path(tree, path).map_or(TypeTag::Unknown, TypeTag::of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(value: &Value, depth: usize) -> Vec<String> {
        extract_paths(value, "", depth).into_iter().collect()
    }

    #[test]
    fn extract_paths_emits_record_keys_and_first_element() {
        let tree = json!({
            "name": "widget",
            "tags": ["a", "b"],
            "items": [{"id": 1}, {"id": 2, "late": true}],
            "meta": {"version": 2}
        });
        assert_eq!(
            paths(&tree, 5),
            vec![
                "items",
                "items[0].id",
                "meta",
                "meta.version",
                "name",
                "tags",
            ]
        );
    }

    #[test]
    fn extract_paths_only_walks_first_sequence_element() {
        // Known limitation: `late` lives only in element 1 and is not reported.
        let tree = json!({"items": [{"id": 1}, {"id": 2, "late": true}]});
        let found = extract_paths(&tree, "", 10);
        assert!(!found.iter().any(|p| p.contains("late")));
    }

    #[test]
    fn extract_paths_honours_prefix() {
        let tree = json!({"x": {"y": 1}});
        let found: Vec<String> = extract_paths(&tree, "root", 5).into_iter().collect();
        assert_eq!(found, vec!["root.x", "root.x.y"]);
    }

    #[test]
    fn extract_paths_root_sequence_uses_bare_index() {
        let tree = json!([{"a": 1}]);
        assert_eq!(paths(&tree, 5), vec!["[0].a"]);
    }

    #[test]
    fn extract_paths_nested_sequences_stack_indices() {
        let tree = json!({"m": [[{"x": 1}]]});
        assert_eq!(paths(&tree, 5), vec!["m", "m[0][0].x"]);
    }

    #[test]
    fn extract_paths_truncates_at_depth() {
        let tree = json!({"a": {"b": {"c": {"d": 1}}}});
        assert_eq!(paths(&tree, 2), vec!["a", "a.b"]);
        assert!(paths(&tree, 0).is_empty());
        assert!(paths(&json!(42), 5).is_empty());
    }

    #[test]
    fn path_values_keep_dotted_keys_addressable() {
        let tree = json!({"a.b": 1, "m": {"x.y": [true]}});
        let values = extract_path_values(&tree, "", 5);
        assert_eq!(values.get("a.b"), Some(&&json!(1)));
        assert_eq!(values.get("m.x.y"), Some(&&json!([true])));
        // The string form alone does not resolve.
        assert_eq!(resolve_path(&tree, "a.b"), None);
    }

    #[test]
    fn empty_key_keeps_its_level() {
        let tree = json!({"": {"x": 1}});
        assert_eq!(paths(&tree, 5), vec!["", ".x"]);
        assert_eq!(resolve_path(&tree, ".x"), Some(&json!(1)));
    }

    #[test]
    fn parse_path_splits_keys_and_indices() {
        assert_eq!(
            parse_path("a.b[0][2].c"),
            vec![
                PathSegment::Key("a".into()),
                PathSegment::Key("b".into()),
                PathSegment::Index(0),
                PathSegment::Index(2),
                PathSegment::Key("c".into()),
            ]
        );
        assert_eq!(
            parse_path("[0].a"),
            vec![PathSegment::Index(0), PathSegment::Key("a".into())]
        );
        assert_eq!(parse_path("odd[x]"), vec![PathSegment::Key("odd[x]".into())]);
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn type_at_path_reports_types_and_unknown() {
        let tree = json!({
            "s": "text",
            "i": 3,
            "f": 1.5,
            "b": true,
            "n": null,
            "o": {},
            "list": [{"k": 1}],
            "empty": []
        });
        assert_eq!(type_at_path(&tree, "s").to_string(), "string");
        assert_eq!(type_at_path(&tree, "i").to_string(), "integer");
        assert_eq!(type_at_path(&tree, "f").to_string(), "float");
        assert_eq!(type_at_path(&tree, "b").to_string(), "boolean");
        assert_eq!(type_at_path(&tree, "n").to_string(), "null");
        assert_eq!(type_at_path(&tree, "o").to_string(), "object");
        assert_eq!(type_at_path(&tree, "list").to_string(), "array[object]");
        assert_eq!(type_at_path(&tree, "list[0].k").to_string(), "integer");
        assert_eq!(type_at_path(&tree, "empty").to_string(), "array[empty]");
        assert_eq!(type_at_path(&tree, "missing.path").to_string(), "unknown");
        assert_eq!(type_at_path(&tree, "s.deeper").to_string(), "unknown");
        assert_eq!(type_at_path(&tree, "list[9]").to_string(), "unknown");
    }
}
