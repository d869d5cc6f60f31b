use extjson_codec::{ConvertError, ExtValue, merge, merge_json, merge_str};
use extjson_types::{Record, SharedValue};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn ext(json: Value) -> ExtValue {
    ExtValue::from(json)
}

fn keys(value: &ExtValue) -> Vec<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

// ── Deep merge ───────────────────────────────────────────────────

#[test]
fn nested_objects_merge() {
    let merged = merge(&ext(json!({"a": {"x": 1}})), &ext(json!({"a": {"y": 2}})), true).unwrap();
    assert_eq!(merged, ext(json!({"a": {"x": 1, "y": 2}})));
}

#[test]
fn update_wins_on_conflict() {
    let base = ext(json!({"a": {"x": 1, "y": 1}, "b": "old"}));
    let update = ext(json!({"a": {"y": 2}, "b": "new"}));
    assert_eq!(merge(&base, &update, true).unwrap(), ext(json!({"a": {"x": 1, "y": 2}, "b": "new"})));
}

#[test]
fn arrays_are_replaced() {
    let merged = merge(&ext(json!({"list": [1, 2, 3]})), &ext(json!({"list": [4]})), true).unwrap();
    assert_eq!(merged, ext(json!({"list": [4]})));
}

#[test]
fn object_replaced_by_scalar_and_back() {
    let merged = merge(&ext(json!({"a": {"x": 1}})), &ext(json!({"a": 5})), true).unwrap();
    assert_eq!(merged, ext(json!({"a": 5})));

    let merged = merge(&ext(json!({"a": 5})), &ext(json!({"a": {"x": 1}})), true).unwrap();
    assert_eq!(merged, ext(json!({"a": {"x": 1}})));
}

#[test]
fn key_order_is_base_then_new_update_keys() {
    let base = ext(json!({"c": 1, "a": 1}));
    let update = ext(json!({"b": 2, "a": 2, "d": 2}));
    let merged = merge(&base, &update, true).unwrap();
    assert_eq!(keys(&merged), vec!["c", "a", "b", "d"]);
}

#[test]
fn deeply_nested_merge() {
    let base = ext(json!({"l1": {"l2": {"l3": {"keep": true}}}}));
    let update = ext(json!({"l1": {"l2": {"l3": {"add": 1}, "sib": null}}}));
    assert_eq!(
        merge(&base, &update, true).unwrap(),
        ext(json!({"l1": {"l2": {"l3": {"keep": true, "add": 1}, "sib": null}}}))
    );
}

// ── Shallow merge ────────────────────────────────────────────────

#[test]
fn shallow_overwrites_top_level() {
    assert_eq!(merge(&ext(json!({"a": 1})), &ext(json!({"a": 2})), false).unwrap(), ext(json!({"a": 2})));

    let merged = merge(&ext(json!({"a": {"x": 1}, "b": 1})), &ext(json!({"a": {"y": 2}})), false).unwrap();
    assert_eq!(merged, ext(json!({"a": {"y": 2}, "b": 1})));
}

// ── Non-object inputs ────────────────────────────────────────────

#[test]
fn non_objects_are_replaced_wholesale() {
    assert_eq!(merge(&ext(json!([1, 2])), &ext(json!({"a": 1})), true).unwrap(), ext(json!({"a": 1})));
    assert_eq!(merge(&ext(json!({"a": 1})), &ext(json!("x")), true).unwrap(), ext(json!("x")));
    assert_eq!(merge(&ext(json!(1)), &ext(json!(null)), true).unwrap(), ExtValue::Null);
}

#[test]
fn extended_values_are_copied() {
    let record = ExtValue::from(Record::new("point").field("x", 1));
    let merged = merge(&ext(json!({"a": 1})), &ExtValue::object([("p", record.clone())]), true).unwrap();
    assert_eq!(merged.get("p"), Some(&record));
}

// ── Inputs are untouched ─────────────────────────────────────────

#[test]
fn inputs_are_not_mutated() {
    let base = ext(json!({"a": {"x": 1}}));
    let update = ext(json!({"a": {"y": 2}}));
    let before = (base.clone(), update.clone());
    let _ = merge(&base, &update, true).unwrap();
    assert_eq!((base, update), before);
}

#[test]
fn shared_nodes_are_resolved_into_copies() {
    let shared = SharedValue::new(ext(json!({"x": 1})));
    let base = ExtValue::object([("a", ExtValue::from(shared.clone()))]);
    let merged = merge(&base, &ext(json!({"a": {"y": 2}})), true).unwrap();

    assert_eq!(merged, ext(json!({"a": {"x": 1, "y": 2}})));
    assert!(matches!(merged.get("a"), Some(ExtValue::Object(_))));
    assert_eq!(shared.get(), ext(json!({"x": 1})));
}

#[test]
fn cyclic_input_is_rejected() {
    let node = SharedValue::new(ExtValue::object([("n", ExtValue::from(1))]));
    let handle = node.clone();
    node.update(|value| {
        if let ExtValue::Object(map) = value {
            map.insert("me".to_owned(), ExtValue::from(handle));
        }
    });

    let err = merge(&ext(json!({})), &ExtValue::from(node), true).unwrap_err();
    match err {
        ConvertError::InvalidMergeInput { path, reason } => {
            assert_eq!(path.to_string(), "/me");
            assert_eq!(reason, "cyclic reference");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── Plain JSON variants ──────────────────────────────────────────

#[test]
fn merge_json_values() {
    let merged = merge_json(&json!({"a": {"x": 1}, "k": [1]}), &json!({"a": {"y": 2}, "k": [2]}), true);
    assert_eq!(merged, json!({"a": {"x": 1, "y": 2}, "k": [2]}));

    let shallow = merge_json(&json!({"a": {"x": 1}}), &json!({"a": {"y": 2}}), false);
    assert_eq!(shallow, json!({"a": {"y": 2}}));
}

#[test]
fn merge_json_key_order() {
    let merged = merge_json(&json!({"z": 0, "m": 0}), &json!({"a": 1, "z": 1}), true);
    let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "m", "a"]);
}

#[test]
fn merge_str_parses_both_sides() {
    let merged = merge_str(r#"{"a": {"x": 1}}"#, r#"{"a": {"y": 2}}"#, true).unwrap();
    assert_eq!(merged, json!({"a": {"x": 1, "y": 2}}));

    let err = merge_str(r#"{"a": 1}"#, "{broken", true).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedJson { .. }));
}
