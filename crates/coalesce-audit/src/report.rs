//! SchemaReporter: Markdown renderings of path schemas and completeness
//! results. Pure formatting; callers decide where the text goes.

use crate::completeness::{CompletenessReport, Verdict};
use coalesce_kernel::{Origin, TypeTag, extract_path_values};
use serde_json::Value;
use std::collections::BTreeMap;

const ROOT_SEQUENCE_GROUP: &str = "(root sequence)";

pub fn sample_with_truncation<T>(items: Vec<T>, limit: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let sample: Vec<T> = items.into_iter().take(limit).collect();
    let truncated = total.saturating_sub(sample.len());
    (sample, truncated)
}

type SchemaRows = Vec<(String, TypeTag)>;

/// Paths grouped by the top-level key they live under. Keys are taken from
/// the tree itself, so a key containing `.` stays one group.
fn schema_groups(tree: &Value, max_depth: usize) -> BTreeMap<String, SchemaRows> {
    let mut groups: BTreeMap<String, SchemaRows> = BTreeMap::new();
    match tree {
        Value::Object(map) if max_depth > 0 => {
            for (key, child) in map {
                let rows = groups.entry(key.clone()).or_default();
                rows.push((key.clone(), TypeTag::of(child)));
                for (path, value) in extract_path_values(child, "", max_depth - 1) {
                    let full = if path.starts_with('[') {
                        format!("{key}{path}")
                    } else {
                        format!("{key}.{path}")
                    };
                    rows.push((full, TypeTag::of(value)));
                }
                rows.sort_by(|left, right| left.0.cmp(&right.0));
            }
        }
        Value::Object(_) => {}
        _ => {
            let rows: SchemaRows = extract_path_values(tree, "", max_depth)
                .into_iter()
                .map(|(path, value)| (path, TypeTag::of(value)))
                .collect();
            if !rows.is_empty() {
                groups.insert(ROOT_SEQUENCE_GROUP.to_string(), rows);
            }
        }
    }
    groups
}

/// Paths of `tree` grouped by top-level key, each with its inferred type.
pub fn render_schema(tree: &Value, name: &str, max_depth: usize) -> String {
    let groups = schema_groups(tree, max_depth);
    let total: usize = groups.values().map(Vec::len).sum();

    let mut lines = vec![
        format!("# Schema: {name}"),
        String::new(),
        format!("- Total paths: {total}"),
        format!("- Top-level keys: {}", groups.len()),
        format!("- Max depth: {max_depth}"),
    ];

    if groups.is_empty() {
        lines.push(String::new());
        lines.push("_No paths found._".to_string());
    }

    for (group, members) in &groups {
        lines.push(String::new());
        lines.push(format!("## {group}"));
        lines.push(String::new());
        lines.push("| Path | Type |".to_string());
        lines.push("|------|------|".to_string());
        for (path, tag) in members {
            lines.push(format!("| `{path}` | `{tag}` |"));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn push_path_section(
    lines: &mut Vec<String>,
    header: &str,
    paths: &[String],
    limit: Option<usize>,
) {
    lines.push(String::new());
    let (sample, truncated) = match limit {
        Some(limit) => sample_with_truncation(paths.to_vec(), limit),
        None => (paths.to_vec(), 0),
    };
    if truncated > 0 {
        lines.push(format!("## {header} (showing {} of {})", sample.len(), paths.len()));
    } else {
        lines.push(format!("## {header}"));
    }
    lines.push(String::new());
    if sample.is_empty() {
        lines.push("_None._".to_string());
        return;
    }
    for path in &sample {
        lines.push(format!("- `{path}`"));
    }
    if truncated > 0 {
        lines.push(format!("- ... and {truncated} more"));
    }
}

pub fn verdict_line(report: &CompletenessReport) -> String {
    match report.verdict {
        Verdict::ZeroLoss => {
            "ZERO LOSS: every source path is reachable in the unified document.".to_string()
        }
        Verdict::LossDetected => format!(
            "LOSS DETECTED: {} source path(s) are not reachable in the unified document.",
            report.missing_count()
        ),
    }
}

/// Pass/fail report. Missing paths are always listed in full; merges and
/// conflicts are capped at `sample_limit`.
pub fn render_completeness(report: &CompletenessReport, sample_limit: usize) -> String {
    let mut lines = vec![
        "# Completeness Report".to_string(),
        String::new(),
        format!("**Verdict:** `{}`", report.verdict),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Paths in source A | {} |", report.path_counts.a),
        format!("| Paths in source B | {} |", report.path_counts.b),
        format!("| Paths in unified document | {} |", report.path_counts.unified),
        format!("| Missing from A | {} |", report.missing_from_a.len()),
        format!("| Missing from B | {} |", report.missing_from_b.len()),
        format!("| Merged paths | {} |", report.merges.len()),
        format!("| Conflicting paths | {} |", report.conflicts.len()),
        format!("| Visuals detected | {} |", report.visuals.len()),
        format!("| Containment policy | {} |", report.containment),
    ];

    for origin in Origin::BOTH {
        let header = format!("Missing from source {origin}");
        push_path_section(&mut lines, &header, report.missing_from(origin), None);
    }
    push_path_section(&mut lines, "Merged paths", &report.merges, Some(sample_limit));
    push_path_section(&mut lines, "Conflicts", &report.conflicts, Some(sample_limit));

    lines.push(String::new());
    lines.push("## Visuals".to_string());
    lines.push(String::new());
    if report.visuals.is_empty() {
        lines.push("_None._".to_string());
    }
    for visual in &report.visuals {
        let kind = serde_json::to_value(visual.kind)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        lines.push(format!(
            "- `{}`: {} ({kind}, {})",
            visual.path, visual.title, visual.format
        ));
    }

    lines.push(String::new());
    lines.push("## Verdict".to_string());
    lines.push(String::new());
    lines.push(verdict_line(report));
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completeness::{ContainmentPolicy, PathCounts};
    use serde_json::json;

    fn report(missing_a: &[&str], merges: &[&str]) -> CompletenessReport {
        let missing_from_a: Vec<String> = missing_a.iter().map(|s| s.to_string()).collect();
        CompletenessReport {
            verdict: if missing_from_a.is_empty() {
                Verdict::ZeroLoss
            } else {
                Verdict::LossDetected
            },
            missing_from_a,
            missing_from_b: Vec::new(),
            merges: merges.iter().map(|s| s.to_string()).collect(),
            conflicts: Vec::new(),
            containment: ContainmentPolicy::Legacy,
            path_counts: PathCounts::default(),
            visuals: Vec::new(),
        }
    }

    #[test]
    fn render_schema_is_idempotent() {
        let tree = json!({"b": {"x": [1]}, "a": "text", "c": [{"d": null}]});
        assert_eq!(
            render_schema(&tree, "source", 5),
            render_schema(&tree, "source", 5)
        );
    }

    #[test]
    fn render_schema_groups_root_sequences() {
        let rendered = render_schema(&json!([{"a": 1}]), "list", 5);
        assert!(rendered.contains("## (root sequence)"));
        assert!(rendered.contains("| `[0].a` | `integer` |"));
    }

    #[test]
    fn render_schema_of_empty_tree_says_so() {
        let rendered = render_schema(&Value::Null, "absent", 5);
        assert!(rendered.contains("- Total paths: 0"));
        assert!(rendered.contains("_No paths found._"));
    }

    #[test]
    fn render_schema_types_dotted_keys() {
        let rendered = render_schema(&json!({"a.b": 1, "c": {"d.e": "x"}}), "dotted", 5);
        assert!(rendered.contains("## a.b\n"));
        assert!(rendered.contains("- Top-level keys: 2"));
        assert!(rendered.contains("| `a.b` | `integer` |"));
        assert!(rendered.contains("| `c.d.e` | `string` |"));
        assert!(!rendered.contains("`unknown`"));
    }

    #[test]
    fn render_completeness_lists_missing_paths_and_verdict() {
        let rendered = render_completeness(&report(&["orphan_key"], &[]), 25);
        assert!(rendered.contains("- `orphan_key`"));
        assert!(rendered.contains("**Verdict:** `loss_detected`"));
        assert!(rendered.trim_end().ends_with(
            "LOSS DETECTED: 1 source path(s) are not reachable in the unified document."
        ));
    }

    #[test]
    fn render_completeness_truncates_merges_only() {
        let rendered = render_completeness(&report(&[], &["a", "b", "c"]), 2);
        assert!(rendered.contains("## Merged paths (showing 2 of 3)"));
        assert!(rendered.contains("- ... and 1 more"));
        assert!(rendered.trim_end().ends_with(
            "ZERO LOSS: every source path is reachable in the unified document."
        ));
    }
}
