//! VisualArtifactDetector: locate renderable artifacts inside a tree.
//!
//! Detection is structural (`data` + `layout` records), by key name, and by
//! string content. Payloads are never decoded or validated; the detector
//! only reports where they are and what they look like.

use crate::paths::join_key;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Only the first few elements of a sequence are inspected.
pub const SEQUENCE_SCAN_LIMIT: usize = 3;

/// Minimum length for an unprefixed string to count as a base64 blob.
pub const BASE64_MIN_LEN: usize = 100;

const MAX_SCAN_DEPTH: usize = 10;

const VISUAL_KEYWORDS: [&str; 8] = [
    "chart",
    "plot",
    "graph",
    "visual",
    "image",
    "figure",
    "diagram",
    "visualization",
];

const DATA_URI_IMAGE_PREFIX: &str = "data:image/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualKind {
    /// A record holding both `data` and `layout` (Plotly-style figure).
    ChartSpec,
    /// A visually named key holding a record, sequence, or string.
    DetectedVisual,
    /// A `data:image/...` URI.
    Base64Image,
    /// A long base64-alphabet string under a visually named key.
    PotentialBase64,
}

/// A located visual artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualRef {
    pub path: String,
    pub title: String,
    pub kind: VisualKind,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_or_url: Option<String>,
}

fn data_uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:image/([A-Za-z0-9.+-]+)").expect("data uri regex must compile")
    })
}

fn base64_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("base64 regex must compile"))
}

fn is_visual_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    VISUAL_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

fn is_chart_spec(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("data") && map.contains_key("layout"))
}

fn is_data_uri(text: &str) -> bool {
    text.starts_with(DATA_URI_IMAGE_PREFIX)
}

fn looks_like_base64(text: &str) -> bool {
    text.len() >= BASE64_MIN_LEN && base64_re().is_match(text)
}

fn data_uri_format(text: &str) -> String {
    data_uri_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| "unknown".to_string(), |m| m.as_str().to_lowercase())
}

/// Human title derived from the last key of a path: `market_chart` → `Market Chart`.
fn title_from_path(path: &str) -> String {
    let last = path.rsplit('.').next().unwrap_or(path);
    let key = last.split('[').next().unwrap_or(last);
    if key.is_empty() {
        return "Untitled".to_string();
    }
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn chart_title(spec: &Value, path: &str) -> String {
    let title = spec.get("layout").and_then(|layout| layout.get("title"));
    let explicit = match title {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Object(map)) => map.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };
    explicit.unwrap_or_else(|| title_from_path(path))
}

fn record_title(value: &Value, path: &str) -> String {
    value
        .get("title")
        .and_then(Value::as_str)
        .map_or_else(|| title_from_path(path), str::to_string)
}

/// Scan `tree` for visual artifacts in traversal order.
pub fn find_visuals(tree: &Value) -> Vec<VisualRef> {
    let mut found = Vec::new();
    scan(tree, "", None, MAX_SCAN_DEPTH, &mut found);
    found
}

fn scan(
    value: &Value,
    path: &str,
    key: Option<&str>,
    depth: usize,
    found: &mut Vec<VisualRef>,
) {
    if depth == 0 {
        return;
    }
    match value {
        Value::Object(map) => {
            if is_chart_spec(value) {
                found.push(VisualRef {
                    path: path.to_string(),
                    title: chart_title(value, path),
                    kind: VisualKind::ChartSpec,
                    format: "plotly".to_string(),
                    data_or_url: None,
                });
                return;
            }
            for (child_key, child) in map {
                let child_path = join_key(path, child_key);
                if is_visual_key(child_key) {
                    if let Some(visual) = named_visual(child, &child_path) {
                        found.push(visual);
                    }
                }
                scan(child, &child_path, Some(child_key.as_str()), depth - 1, found);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().take(SEQUENCE_SCAN_LIMIT).enumerate() {
                scan(item, &format!("{path}[{index}]"), key, depth - 1, found);
            }
        }
        Value::String(text) => {
            if is_data_uri(text) {
                found.push(VisualRef {
                    path: path.to_string(),
                    title: title_from_path(path),
                    kind: VisualKind::Base64Image,
                    format: data_uri_format(text),
                    data_or_url: Some(text.clone()),
                });
            } else if key.is_some_and(is_visual_key) && looks_like_base64(text) {
                found.push(VisualRef {
                    path: path.to_string(),
                    title: title_from_path(path),
                    kind: VisualKind::PotentialBase64,
                    format: "base64".to_string(),
                    data_or_url: None,
                });
            }
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

/// Classify the value under a visually named key. Chart specs and embedded
/// payloads are left to the recursive scan so each artifact is reported once.
fn named_visual(value: &Value, path: &str) -> Option<VisualRef> {
    let (format, data_or_url, title) = match value {
        Value::Object(_) if is_chart_spec(value) => return None,
        Value::Object(_) => ("object", None, record_title(value, path)),
        Value::Array(_) => ("array", None, title_from_path(path)),
        Value::String(text) if is_data_uri(text) || looks_like_base64(text) => return None,
        Value::String(text) if text.starts_with("http://") || text.starts_with("https://") => {
            ("url", Some(text.clone()), title_from_path(path))
        }
        Value::String(_) => ("text", None, title_from_path(path)),
        Value::Number(_) | Value::Bool(_) | Value::Null => return None,
    };
    Some(VisualRef {
        path: path.to_string(),
        title,
        kind: VisualKind::DetectedVisual,
        format: format.to_string(),
        data_or_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(found: &[VisualRef]) -> Vec<(String, VisualKind)> {
        found.iter().map(|v| (v.path.clone(), v.kind)).collect()
    }

    #[test]
    fn chart_shaped_record_is_found_with_its_path() {
        let tree = json!({
            "analysis": {
                "sections": [
                    {"figure_like": {
                        "data": [{"x": [1, 2]}],
                        "layout": {"title": {"text": "Revenue"}}
                    }}
                ]
            }
        });
        let found = find_visuals(&tree);
        let chart = found
            .iter()
            .find(|v| v.kind == VisualKind::ChartSpec)
            .expect("chart spec should be detected");
        assert_eq!(chart.path, "analysis.sections[0].figure_like");
        assert_eq!(chart.title, "Revenue");
        assert_eq!(chart.format, "plotly");
    }

    #[test]
    fn chart_under_visual_key_is_reported_once() {
        let tree = json!({"market_chart": {"data": [], "layout": {}}});
        let found = find_visuals(&tree);
        assert_eq!(
            kinds(&found),
            vec![("market_chart".to_string(), VisualKind::ChartSpec)]
        );
        assert_eq!(found[0].title, "Market Chart");
    }

    #[test]
    fn data_uri_anywhere_is_a_base64_image() {
        let tree = json!({"notes": ["data:image/png;base64,iVBORw0KGgo="]});
        let found = find_visuals(&tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, VisualKind::Base64Image);
        assert_eq!(found[0].path, "notes[0]");
        assert_eq!(found[0].format, "png");
        assert_eq!(
            found[0].data_or_url.as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn svg_data_uri_keeps_subtype() {
        let tree = json!({"logo": "data:image/svg+xml;base64,PHN2Zz4="});
        assert_eq!(find_visuals(&tree)[0].format, "svg+xml");
    }

    #[test]
    fn long_base64_under_visual_key_is_potential_base64() {
        let blob = "A".repeat(BASE64_MIN_LEN + 4);
        let tree = json!({"hero_image": blob.clone(), "plain": blob});
        let found = find_visuals(&tree);
        assert_eq!(
            kinds(&found),
            vec![("hero_image".to_string(), VisualKind::PotentialBase64)]
        );
        assert!(found[0].data_or_url.is_none());
    }

    #[test]
    fn visual_keys_classify_by_value_shape() {
        let tree = json!({
            "Images": [{"url": "https://cdn/x.png"}],
            "diagram_ref": "https://example.com/d.svg",
            "graph_caption": "Quarterly growth",
            "plot_meta": {"title": "Spread"},
            "figure_count": 3
        });
        let found = find_visuals(&tree);
        let summary: Vec<(String, String)> = found
            .iter()
            .map(|v| (v.path.clone(), v.format.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Images".to_string(), "array".to_string()),
                ("diagram_ref".to_string(), "url".to_string()),
                ("graph_caption".to_string(), "text".to_string()),
                ("plot_meta".to_string(), "object".to_string()),
            ]
        );
        assert_eq!(found[3].title, "Spread");
        assert_eq!(
            found[1].data_or_url.as_deref(),
            Some("https://example.com/d.svg")
        );
    }

    #[test]
    fn sequence_scan_is_bounded() {
        let tree = json!({
            "gallery": [
                "plain", "plain", "plain",
                "data:image/jpeg;base64,AAAA"
            ]
        });
        let found = find_visuals(&tree);
        assert!(found.iter().all(|v| v.kind != VisualKind::Base64Image));
    }
}
