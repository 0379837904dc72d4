//! Merge and path-extraction properties over generated trees, plus the
//! end-to-end scenarios a unified document must satisfy.

use coalesce_kernel::{
    BuildRequest, Origin, Record, Status, UnifiedOutputBuilder, VisualKind, extract_paths, merge,
    parse_path, project_origin,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn arb_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-50i64..50).prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_record() -> impl Strategy<Value = Record> {
    prop::collection::btree_map("[a-d]{1,2}", arb_tree(), 0..5)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #[test]
    fn merge_projects_back_to_each_source(a in arb_record(), b in arb_record()) {
        let merged = merge(Some(&a), Some(&b));
        prop_assert_eq!(project_origin(&merged, Origin::A), a);
        prop_assert_eq!(project_origin(&merged, Origin::B), b);
    }

    #[test]
    fn merge_covers_every_key(a in arb_record(), b in arb_record()) {
        let merged = merge(Some(&a), Some(&b));
        for key in a.keys().chain(b.keys()) {
            prop_assert!(merged.contains_key(key), "key {} missing", key);
        }
    }

    #[test]
    fn scalar_conflicts_keep_both_values_verbatim(a in arb_record(), b in arb_record()) {
        let merged = merge(Some(&a), Some(&b));
        for (key, a_value) in &a {
            let Some(b_value) = b.get(key) else { continue };
            let mergeable = matches!(
                (a_value, b_value),
                (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
            );
            if !mergeable {
                prop_assert_eq!(&merged[key]["values"]["A"], a_value);
                prop_assert_eq!(&merged[key]["values"]["B"], b_value);
            }
        }
    }

    #[test]
    fn extract_paths_is_deterministic_and_depth_bounded(tree in arb_tree(), depth in 0usize..6) {
        let first = extract_paths(&tree, "", depth);
        let second = extract_paths(&tree, "", depth);
        prop_assert_eq!(&first, &second);
        for path in &first {
            prop_assert!(parse_path(path).len() <= depth, "{} deeper than {}", path, depth);
        }
    }
}

#[test]
fn deeply_nested_tree_is_truncated_not_rejected() {
    let mut tree = json!("leaf");
    for level in 0..200 {
        let mut wrapper = Record::new();
        wrapper.insert(format!("k{level}"), tree);
        tree = Value::Object(wrapper);
    }
    let found = extract_paths(&tree, "", 10);
    assert_eq!(found.len(), 10);
    assert!(found.iter().all(|path| parse_path(path).len() <= 10));
}

fn build(a: Option<&Value>, b: Option<&Value>) -> coalesce_kernel::UnifiedDocument {
    UnifiedOutputBuilder::default().build_at(
        BuildRequest {
            id: "scenario".to_string(),
            input: Record::new(),
            source_a: a,
            source_b: b,
            status: Status::Ok,
            errors: Vec::new(),
        },
        "2026-01-01T00:00:00.000Z".to_string(),
    )
}

#[test]
fn chart_spec_in_merged_is_listed_with_its_path() {
    let a = json!({
        "insights": {
            "trend": {"data": [{"y": [1, 2, 3]}], "layout": {"title": "Trend"}}
        }
    });
    let b = json!({"insights": {"summary": "steady"}});
    let doc = build(Some(&a), Some(&b));
    let visuals = doc.visuals();
    let chart = visuals
        .iter()
        .find(|visual| visual.kind == VisualKind::ChartSpec)
        .expect("chart should be listed");
    assert_eq!(chart.path, "insights.trend.value");
    assert_eq!(chart.title, "Trend");
}

#[test]
fn unknown_keys_from_both_sides_survive_with_prefixes() {
    let a = json!({"foo": 1});
    let b = json!({"bar": 2});
    let doc = build(Some(&a), Some(&b));
    assert_eq!(doc.merged.get("A_foo"), Some(&json!(1)));
    assert_eq!(doc.merged.get("B_bar"), Some(&json!(2)));
}
