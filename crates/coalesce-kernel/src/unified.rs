//! UnifiedOutputBuilder: assemble the unified document for one analysis run.
//!
//! ```text
//! {
//!   "id": ..., "input": {...}, "status": "ok|partial|error", "timestamp": ...,
//!   "raw_sources": {"A": <tree|null>, "B": <tree|null>},
//!   "merged": {<known sections>, A_<key>, B_<key>, "visuals": [...]},
//!   "errors": [{"source": ..., "error": ...}]
//! }
//! ```
//!
//! Known analytical sections are deep-merged. Every other top-level key is
//! copied verbatim under a source-prefixed key so nothing is dropped.

use crate::Record;
use crate::error::CoalesceError;
use crate::merge::{Origin, merge, project_entry};
use crate::visuals::{VisualRef, find_visuals};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Top-level sections merged by [`crate::merge::merge`] rather than prefixed.
pub const DEFAULT_KNOWN_SECTIONS: [&str; 7] = [
    "product_info",
    "scores",
    "swot",
    "images",
    "strategy",
    "insights",
    "metadata",
];

/// Key under `merged` holding the detected visuals.
pub const VISUALS_KEY: &str = "visuals";

/// Catch-all key for a source tree that is not a record.
const ROOT_KEY: &str = "root";

/// Run status, ordered by severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Ok,
    Partial,
    Error,
}

impl Status {
    /// Status implied by which sources produced output.
    pub fn from_presence(has_a: bool, has_b: bool) -> Self {
        match (has_a, has_b) {
            (true, true) => Status::Ok,
            (true, false) | (false, true) => Status::Partial,
            (false, false) => Status::Error,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Partial => "partial",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoalesceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" => Ok(Status::Ok),
            "partial" => Ok(Status::Partial),
            "error" => Ok(Status::Error),
            _ => Err(CoalesceError::InvalidStatus(s.to_string())),
        }
    }
}

/// One pipeline that failed or was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub source: String,
    pub error: String,
}

impl ErrorRecord {
    pub fn new(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            error: error.into(),
        }
    }
}

impl FromStr for ErrorRecord {
    type Err = CoalesceError;

    /// Parse `source=message`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((source, error)) if !source.trim().is_empty() => {
                Ok(ErrorRecord::new(source.trim(), error.trim()))
            }
            _ => Err(CoalesceError::InvalidErrorRecord(s.to_string())),
        }
    }
}

/// Verbatim copies of both source trees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSources {
    #[serde(rename = "A", default)]
    pub a: Option<Value>,
    #[serde(rename = "B", default)]
    pub b: Option<Value>,
}

/// The terminal artifact of one analysis run. Never mutated after build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDocument {
    pub id: String,
    pub input: Record,
    pub status: Status,
    pub timestamp: String,
    pub raw_sources: RawSources,
    pub merged: Record,
    pub errors: Vec<ErrorRecord>,
}

impl UnifiedDocument {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Visual refs attached under `merged.visuals`, if any.
    pub fn visuals(&self) -> Vec<VisualRef> {
        self.merged
            .get(VISUALS_KEY)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

/// Builder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    pub known_sections: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            known_sections: DEFAULT_KNOWN_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl BuildOptions {
    /// `visuals` is never a known section: the detector owns `merged.visuals`,
    /// so a source key of that name is kept as a catch-all instead.
    pub fn is_known(&self, key: &str) -> bool {
        key != VISUALS_KEY && self.known_sections.iter().any(|section| section == key)
    }
}

/// Inputs for one build.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest<'a> {
    pub id: String,
    pub input: Record,
    pub source_a: Option<&'a Value>,
    pub source_b: Option<&'a Value>,
    pub status: Status,
    pub errors: Vec<ErrorRecord>,
}

impl BuildRequest<'_> {
    fn source(&self, origin: Origin) -> Option<&Value> {
        match origin {
            Origin::A => self.source_a,
            Origin::B => self.source_b,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnifiedOutputBuilder {
    options: BuildOptions,
}

impl UnifiedOutputBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Build the document stamped with the current UTC time.
    pub fn build(&self, request: BuildRequest<'_>) -> UnifiedDocument {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.build_at(request, timestamp)
    }

    /// Build the document with an explicit timestamp. Identical inputs give
    /// identical documents.
    pub fn build_at(&self, request: BuildRequest<'_>, timestamp: String) -> UnifiedDocument {
        let mut merged = self.merge_sections(&request);
        let visuals = find_visuals(&Value::Object(merged.clone()));
        merged.insert(
            VISUALS_KEY.to_string(),
            serde_json::to_value(&visuals).unwrap_or_else(|_| Value::Array(Vec::new())),
        );

        let presence =
            Status::from_presence(request.source_a.is_some(), request.source_b.is_some());
        let status = request.status.max(presence);

        tracing::debug!(
            id = %request.id,
            status = %status,
            merged_keys = merged.len(),
            visuals = visuals.len(),
            "built unified document"
        );

        UnifiedDocument {
            raw_sources: RawSources {
                a: request.source_a.cloned(),
                b: request.source_b.cloned(),
            },
            id: request.id,
            input: request.input,
            status,
            timestamp,
            merged,
            errors: request.errors,
        }
    }

    fn merge_sections(&self, request: &BuildRequest<'_>) -> Record {
        let a_known = self.known_part(request.source_a);
        let b_known = self.known_part(request.source_b);
        let mut merged = merge(a_known.as_ref(), b_known.as_ref());

        for origin in Origin::BOTH {
            match request.source(origin) {
                Some(Value::Object(tree)) => {
                    for (key, value) in tree {
                        if !self.options.is_known(key) {
                            merged.insert(origin.prefixed(key), value.clone());
                        }
                    }
                }
                Some(other) => {
                    merged.insert(origin.prefixed(ROOT_KEY), other.clone());
                }
                None => {}
            }
        }
        merged
    }

    fn known_part(&self, tree: Option<&Value>) -> Option<Record> {
        let tree = tree?.as_object()?;
        Some(
            tree.iter()
                .filter(|(key, _)| self.options.is_known(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Recover one side's contribution from a unified `merged` record:
    /// known sections are projected, the side's prefixed keys are unprefixed,
    /// the other side's keys and `visuals` are skipped.
    pub fn project_merged(&self, merged: &Record, origin: Origin) -> Record {
        let own_prefix = origin.prefixed("");
        let other_prefix = origin.other().prefixed("");
        let mut out = Record::new();
        for (key, entry) in merged {
            if key == VISUALS_KEY {
                continue;
            }
            if self.options.is_known(key) {
                if let Some(value) = project_entry(entry, origin) {
                    out.insert(key.clone(), value);
                }
            } else if let Some(original) = key.strip_prefix(&own_prefix) {
                out.insert(original.to_string(), entry.clone());
            } else if !key.starts_with(&other_prefix) {
                if let Some(value) = project_entry(entry, origin) {
                    out.insert(key.clone(), value);
                }
            }
        }
        out
    }
}
