//! DeepMerger: combine two optional records into one origin-tagged record.
//!
//! Per key across both sides:
//!
//! | present in | shapes            | merged entry                                     |
//! |------------|-------------------|--------------------------------------------------|
//! | A only     | any               | `{"source": "A", "value": a}`                    |
//! | B only     | any               | `{"source": "B", "value": b}`                    |
//! | both       | record / record   | recursive merge, no wrapper                      |
//! | both       | sequence/sequence | A's elements tagged `A`, then B's tagged `B`     |
//! | both       | anything else     | `{"sources": ["A","B"], "values": {"A": a, "B": b}}` |
//!
//! Merging is total: every pair of well-formed trees lands in one of the rows.

use crate::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

const SOURCE_KEY: &str = "source";
const VALUE_KEY: &str = "value";
const SOURCES_KEY: &str = "sources";
const VALUES_KEY: &str = "values";

/// Which source document contributed a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Origin {
    A,
    B,
}

impl Origin {
    pub const BOTH: [Origin; 2] = [Origin::A, Origin::B];

    pub const fn label(self) -> &'static str {
        match self {
            Origin::A => "A",
            Origin::B => "B",
        }
    }

    pub const fn other(self) -> Origin {
        match self {
            Origin::A => Origin::B,
            Origin::B => Origin::A,
        }
    }

    pub fn from_label(label: &str) -> Option<Origin> {
        match label {
            "A" => Some(Origin::A),
            "B" => Some(Origin::B),
            _ => None,
        }
    }

    /// Source-prefixed key used for catch-all placement, e.g. `A_notes`.
    pub fn prefixed(self, key: &str) -> String {
        format!("{}_{key}", self.label())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn tagged(origin: Origin, value: Value) -> Value {
    let mut entry = Record::new();
    entry.insert(SOURCE_KEY.to_string(), Value::from(origin.label()));
    entry.insert(VALUE_KEY.to_string(), value);
    Value::Object(entry)
}

fn two_sided(a: Value, b: Value) -> Value {
    let mut values = Record::new();
    values.insert(Origin::A.label().to_string(), a);
    values.insert(Origin::B.label().to_string(), b);
    let mut entry = Record::new();
    entry.insert(
        SOURCES_KEY.to_string(),
        json!([Origin::A.label(), Origin::B.label()]),
    );
    entry.insert(VALUES_KEY.to_string(), Value::Object(values));
    Value::Object(entry)
}

/// Merge two optional records. A missing side behaves like an empty record.
///
/// Output key order is A's keys in A's order followed by B-only keys in B's
/// order.
pub fn merge(a: Option<&Record>, b: Option<&Record>) -> Record {
    let empty = Record::new();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);

    let mut merged = Record::new();
    for (key, a_value) in a {
        let entry = match b.get(key) {
            Some(b_value) => merge_values(a_value, b_value),
            None => tagged(Origin::A, a_value.clone()),
        };
        merged.insert(key.clone(), entry);
    }
    for (key, b_value) in b {
        if !a.contains_key(key) {
            merged.insert(key.clone(), tagged(Origin::B, b_value.clone()));
        }
    }
    merged
}

fn merge_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => Value::Object(merge(Some(a), Some(b))),
        (Value::Array(a), Value::Array(b)) => Value::Array(
            a.iter()
                .map(|item| tagged(Origin::A, item.clone()))
                .chain(b.iter().map(|item| tagged(Origin::B, item.clone())))
                .collect(),
        ),
        _ => two_sided(a.clone(), b.clone()),
    }
}

/// Read a `{source, value}` wrapper.
///
/// Inside merge output a bare string never sits directly under a record key,
/// so a string `source` identifies a wrapper without ambiguity.
pub fn as_tagged(entry: &Value) -> Option<(Origin, &Value)> {
    let map = entry.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let origin = Origin::from_label(map.get(SOURCE_KEY)?.as_str()?)?;
    Some((origin, map.get(VALUE_KEY)?))
}

/// Read a `{sources: ["A","B"], values: {...}}` wrapper.
pub fn as_two_sided(entry: &Value) -> Option<&Record> {
    let map = entry.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let sources = map.get(SOURCES_KEY)?.as_array()?;
    let labels: Vec<&str> = sources.iter().filter_map(Value::as_str).collect();
    if labels != [Origin::A.label(), Origin::B.label()] {
        return None;
    }
    map.get(VALUES_KEY)?.as_object()
}

/// Recover one side's contribution from a merged record.
///
/// For records `a` and `b`, `project_origin(&merge(Some(&a), Some(&b)), Origin::A) == a`.
pub fn project_origin(merged: &Record, origin: Origin) -> Record {
    let mut out = Record::new();
    for (key, entry) in merged {
        if let Some(value) = project_entry(entry, origin) {
            out.insert(key.clone(), value);
        }
    }
    out
}

/// Project a single merged entry; `None` when `origin` did not contribute it.
pub fn project_entry(entry: &Value, origin: Origin) -> Option<Value> {
    if let Some((source, value)) = as_tagged(entry) {
        return (source == origin).then(|| value.clone());
    }
    if let Some(values) = as_two_sided(entry) {
        return values.get(origin.label()).cloned();
    }
    match entry {
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| match as_tagged(item) {
                    Some((source, value)) => (source == origin).then(|| value.clone()),
                    None => Some(item.clone()),
                })
                .collect(),
        )),
        Value::Object(map) => Some(Value::Object(project_origin(map, origin))),
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => Some(entry.clone()),
    }
}
