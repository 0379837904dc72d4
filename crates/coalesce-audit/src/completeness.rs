//! CompletenessVerifier: prove that no source path was lost.
//!
//! Every path of each source tree must be reachable in the unified document,
//! either in `raw_sources.<side>` or in `merged`. The audit also lists paths
//! both sources share (merges) and shared paths whose values differ
//! (conflicts).

use crate::config::CoalesceConfig;
use coalesce_kernel::{
    BuildOptions, Origin, Record, UnifiedDocument, UnifiedOutputBuilder, VERIFY_MAX_DEPTH,
    VISUALS_KEY, VisualRef, extract_path_values, extract_paths, find_visuals,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// How a source path is matched against the unified document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentPolicy {
    /// Found if any unified path contains the source path as a raw
    /// substring. Can report a path as found when it merely shares text
    /// with an unrelated path.
    #[default]
    Legacy,
    /// Found only through the side's projection of `merged` or a unified
    /// path ending with the source path on a segment boundary.
    Structural,
}

impl ContainmentPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContainmentPolicy::Legacy => "legacy",
            ContainmentPolicy::Structural => "structural",
        }
    }
}

impl fmt::Display for ContainmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(ContainmentPolicy::Legacy),
            "structural" => Ok(ContainmentPolicy::Structural),
            other => Err(format!(
                "unknown containment policy `{other}`; expected legacy or structural"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    ZeroLoss,
    LossDetected,
}

impl Verdict {
    pub const fn as_str(self) -> &'static str {
        match self {
            Verdict::ZeroLoss => "zero_loss",
            Verdict::LossDetected => "loss_detected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCounts {
    pub a: usize,
    pub b: usize,
    pub unified: usize,
}

/// Result of one verification run. Derived data, never stored in the
/// unified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    #[serde(rename = "missing_from_A")]
    pub missing_from_a: Vec<String>,
    #[serde(rename = "missing_from_B")]
    pub missing_from_b: Vec<String>,
    pub merges: Vec<String>,
    pub conflicts: Vec<String>,
    pub verdict: Verdict,
    pub containment: ContainmentPolicy,
    pub path_counts: PathCounts,
    pub visuals: Vec<VisualRef>,
}

impl CompletenessReport {
    pub fn is_zero_loss(&self) -> bool {
        self.verdict == Verdict::ZeroLoss
    }

    pub fn missing_count(&self) -> usize {
        self.missing_from_a.len() + self.missing_from_b.len()
    }

    pub fn missing_from(&self, origin: Origin) -> &[String] {
        match origin {
            Origin::A => &self.missing_from_a,
            Origin::B => &self.missing_from_b,
        }
    }
}

/// Paths of one source side as seen inside the unified document.
struct SideIndex {
    raw: BTreeSet<String>,
    merged: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct CompletenessVerifier {
    max_depth: usize,
    containment: ContainmentPolicy,
    builder: UnifiedOutputBuilder,
}

impl Default for CompletenessVerifier {
    fn default() -> Self {
        Self::new(
            VERIFY_MAX_DEPTH,
            ContainmentPolicy::default(),
            BuildOptions::default(),
        )
    }
}

impl CompletenessVerifier {
    /// `build` must match the options the unified document was built with;
    /// the structural policy uses its known sections to project `merged`.
    pub fn new(max_depth: usize, containment: ContainmentPolicy, build: BuildOptions) -> Self {
        Self {
            max_depth,
            containment,
            builder: UnifiedOutputBuilder::new(build),
        }
    }

    pub fn from_config(config: &CoalesceConfig) -> Self {
        Self::new(
            config.audit.verify_max_depth,
            config.audit.containment,
            config.build.clone(),
        )
    }

    pub fn verify_document(
        &self,
        source_a: Option<&Value>,
        source_b: Option<&Value>,
        unified: &UnifiedDocument,
    ) -> CompletenessReport {
        self.verify(source_a, source_b, &unified.to_value())
    }

    /// Verify against a unified document given as an untyped tree, so a
    /// malformed or partial document on disk can still be audited.
    pub fn verify(
        &self,
        source_a: Option<&Value>,
        source_b: Option<&Value>,
        unified: &Value,
    ) -> CompletenessReport {
        let values_a = self.values_of(source_a);
        let values_b = self.values_of(source_b);
        let paths_a: BTreeSet<String> = values_a.keys().cloned().collect();
        let paths_b: BTreeSet<String> = values_b.keys().cloned().collect();
        let paths_u = extract_paths(unified, "", self.max_depth);

        let merged = unified.get("merged");
        let merged_record = merged.and_then(Value::as_object);
        let merged_paths = self.paths_of(merged);

        let index_a = self.side_index(unified, merged_record, &merged_paths, Origin::A);
        let index_b = self.side_index(unified, merged_record, &merged_paths, Origin::B);

        let missing_from_a = self.missing(&paths_a, &index_a, &paths_u);
        let missing_from_b = self.missing(&paths_b, &index_b, &paths_u);

        let shared: Vec<&String> = paths_a.intersection(&paths_b).collect();
        let merges: Vec<String> = shared
            .iter()
            .filter(|path| match self.containment {
                ContainmentPolicy::Legacy => merged_paths.contains(path.as_str()),
                ContainmentPolicy::Structural => {
                    index_a.merged.contains(path.as_str()) && index_b.merged.contains(path.as_str())
                }
            })
            .map(|path| path.to_string())
            .collect();
        let conflicts: Vec<String> = shared
            .iter()
            .filter(|path| match (values_a.get(path.as_str()), values_b.get(path.as_str())) {
                (Some(a), Some(b)) => values_conflict(a, b),
                _ => false,
            })
            .map(|path| path.to_string())
            .collect();

        let verdict = if missing_from_a.is_empty() && missing_from_b.is_empty() {
            Verdict::ZeroLoss
        } else {
            Verdict::LossDetected
        };

        tracing::debug!(
            containment = %self.containment,
            paths_a = paths_a.len(),
            paths_b = paths_b.len(),
            paths_unified = paths_u.len(),
            missing = missing_from_a.len() + missing_from_b.len(),
            verdict = %verdict,
            "completeness verified"
        );

        CompletenessReport {
            missing_from_a,
            missing_from_b,
            merges,
            conflicts,
            verdict,
            containment: self.containment,
            path_counts: PathCounts {
                a: paths_a.len(),
                b: paths_b.len(),
                unified: paths_u.len(),
            },
            visuals: merged_visuals(merged_record),
        }
    }

    fn values_of<'a>(&self, tree: Option<&'a Value>) -> BTreeMap<String, &'a Value> {
        tree.map(|tree| extract_path_values(tree, "", self.max_depth))
            .unwrap_or_default()
    }

    fn paths_of(&self, tree: Option<&Value>) -> BTreeSet<String> {
        tree.map(|tree| extract_paths(tree, "", self.max_depth))
            .unwrap_or_default()
    }

    fn side_index(
        &self,
        unified: &Value,
        merged_record: Option<&Record>,
        merged_paths: &BTreeSet<String>,
        origin: Origin,
    ) -> SideIndex {
        let raw_source = unified
            .get("raw_sources")
            .and_then(|raw| raw.get(origin.label()));
        let merged = match self.containment {
            ContainmentPolicy::Legacy => merged_paths.clone(),
            ContainmentPolicy::Structural => {
                let projected = merged_record
                    .map(|record| self.builder.project_merged(record, origin))
                    .unwrap_or_default();
                extract_paths(&Value::Object(projected), "", self.max_depth)
            }
        };
        SideIndex {
            raw: self.paths_of(raw_source),
            merged,
        }
    }

    fn missing(
        &self,
        source_paths: &BTreeSet<String>,
        index: &SideIndex,
        unified_paths: &BTreeSet<String>,
    ) -> Vec<String> {
        source_paths
            .iter()
            .filter(|path| !self.is_found(path, index, unified_paths))
            .cloned()
            .collect()
    }

    fn is_found(&self, path: &str, index: &SideIndex, unified_paths: &BTreeSet<String>) -> bool {
        if index.raw.contains(path) || index.merged.contains(path) {
            return true;
        }
        match self.containment {
            // Every string contains the empty path, so it only counts when
            // matched exactly above.
            ContainmentPolicy::Legacy => {
                !path.is_empty() && unified_paths.iter().any(|upath| upath.contains(path))
            }
            ContainmentPolicy::Structural => unified_paths
                .iter()
                .any(|upath| ends_on_segment(upath, path)),
        }
    }
}

/// `upath` ends with `path` and the match starts at a segment boundary.
fn ends_on_segment(upath: &str, path: &str) -> bool {
    let Some(head) = upath.strip_suffix(path) else {
        return false;
    };
    head.is_empty() || head.ends_with('.') || path.starts_with('[')
}

fn values_conflict(a: &Value, b: &Value) -> bool {
    let both_containers = is_container(a) && is_container(b);
    !both_containers && a != b
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn merged_visuals(merged: Option<&Record>) -> Vec<VisualRef> {
    let Some(merged) = merged else {
        return Vec::new();
    };
    let scanned: Record = merged
        .iter()
        .filter(|(key, _)| key.as_str() != VISUALS_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    find_visuals(&Value::Object(scanned))
}

/// Verify with default depth, legacy containment, and default known sections.
pub fn verify(
    source_a: Option<&Value>,
    source_b: Option<&Value>,
    unified: &Value,
) -> CompletenessReport {
    CompletenessVerifier::default().verify(source_a, source_b, unified)
}
