use extjson_types::{ExtValue, JsonPath, PathSegment, Record, SharedValue, ValueSet};
use pretty_assertions::assert_eq;

// ── ValueSet ─────────────────────────────────────────────────────

#[test]
fn set_deduplicates() {
    let mut set = ValueSet::new();
    assert!(set.insert(1));
    assert!(set.insert("one"));
    assert!(!set.insert(1));
    assert_eq!(set.len(), 2);
}

#[test]
fn set_equality_ignores_order() {
    let a: ValueSet = [1, 2, 3].into_iter().collect();
    let b: ValueSet = [3, 1, 2].into_iter().collect();
    assert_eq!(a, b);

    let c: ValueSet = [1, 2].into_iter().collect();
    assert_ne!(a, c);
}

#[test]
fn set_remove_and_contains() {
    let mut set: ValueSet = ["a", "b"].into_iter().collect();
    assert!(set.contains(&ExtValue::from("a")));
    assert!(set.remove(&ExtValue::from("a")));
    assert!(!set.remove(&ExtValue::from("a")));
    assert!(!set.contains(&ExtValue::from("a")));
    assert_eq!(set.into_vec(), vec![ExtValue::from("b")]);
}

#[test]
fn set_empty() {
    let set = ValueSet::default();
    assert!(set.is_empty());
    assert_eq!(set.iter().count(), 0);
}

// ── Record ───────────────────────────────────────────────────────

#[test]
fn record_builder_keeps_field_order() {
    let record = Record::new("point").field("y", 2).field("x", 1);
    assert_eq!(record.kind(), "point");
    let names: Vec<&String> = record.fields().keys().collect();
    assert_eq!(names, vec!["y", "x"]);
    assert_eq!(record.get("x"), Some(&ExtValue::from(1)));
}

#[test]
fn record_insert_returns_previous() {
    let mut record = Record::new("point");
    assert_eq!(record.insert("x", 1), None);
    assert_eq!(record.insert("x", 5), Some(ExtValue::from(1)));
    assert_eq!(record.into_fields().len(), 1);
}

#[test]
fn records_of_different_kinds_differ() {
    let a = Record::new("point").field("x", 1);
    let b = Record::new("vector").field("x", 1);
    assert_ne!(a, b);
}

// ── SharedValue ──────────────────────────────────────────────────

#[test]
fn shared_clones_share_identity() {
    let a = SharedValue::new(1);
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.id(), b.id());

    let c = SharedValue::new(1);
    assert!(!a.ptr_eq(&c));
    assert_ne!(a.id(), c.id());
}

#[test]
fn shared_set_is_visible_through_every_handle() {
    let a = SharedValue::new("old");
    let b = a.clone();
    let previous = b.set("new");
    assert_eq!(previous, ExtValue::from("old"));
    assert_eq!(a.get(), ExtValue::from("new"));
}

#[test]
fn shared_update_and_with() {
    let shared = SharedValue::new(ExtValue::array([]));
    shared.update(|value| {
        if let ExtValue::Array(items) = value {
            items.push(ExtValue::from(1));
        }
    });
    assert_eq!(shared.with(|value| value.as_array().map(Vec::len)), Some(1));
}

#[test]
fn shared_can_contain_itself() {
    let node = SharedValue::new(ExtValue::array([]));
    let handle = node.clone();
    node.update(|value| *value = ExtValue::array([ExtValue::from(handle)]));

    // Debug output does not recurse into the node.
    assert!(format!("{node:?}").starts_with("SharedValue(0x"));
}

// ── JsonPath ─────────────────────────────────────────────────────

#[test]
fn root_path_display() {
    assert_eq!(JsonPath::root().to_string(), "<root>");
    assert!(JsonPath::root().is_root());
}

#[test]
fn path_display_is_a_json_pointer() {
    let path = JsonPath::root().child("users").child(0usize).child("name");
    assert_eq!(path.to_string(), "/users/0/name");
    assert_eq!(path.len(), 3);
}

#[test]
fn path_escapes_tilde_and_slash() {
    let path = JsonPath::root().child("a/b").child("m~n");
    assert_eq!(path.to_string(), "/a~1b/m~0n");
}

#[test]
fn path_push_and_pop() {
    let mut path = JsonPath::root();
    path.push("a");
    path.push(2usize);
    assert_eq!(path.pop(), Some(PathSegment::Index(2)));
    assert_eq!(path.segments(), &[PathSegment::Key("a".to_owned())]);
}
