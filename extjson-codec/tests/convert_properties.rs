use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use extjson_codec::{DecodeOptions, EncodeOptions, ExtValue, decode, encode, merge, merge_json};
use extjson_types::ValueSet;
use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

// ── Strategies ───────────────────────────────────────────────────

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1i32..9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000_000)
        .prop_map(|(h, m, s, n)| NaiveTime::from_hms_nano_opt(h, m, s, n).unwrap())
}

fn arb_leaf() -> impl Strategy<Value = ExtValue> {
    prop_oneof![
        Just(ExtValue::Null),
        any::<bool>().prop_map(ExtValue::from),
        any::<i64>().prop_map(ExtValue::from),
        "[a-zA-Z0-9 éß€]{0,12}".prop_map(ExtValue::from),
        (0i64..4_000_000_000, -12i32..=14).prop_map(|(secs, hours)| {
            let offset = FixedOffset::east_opt(hours * 3600).unwrap();
            ExtValue::from(offset.timestamp_opt(secs, 0).unwrap())
        }),
        (arb_date(), arb_time()).prop_map(|(d, t)| ExtValue::from(d.and_time(t))),
        arb_date().prop_map(ExtValue::from),
        arb_time().prop_map(ExtValue::from),
        (-1_000_000_000i64..1_000_000_000, 0u32..1_000_000_000)
            .prop_map(|(s, n)| ExtValue::from(TimeDelta::new(s, n).unwrap())),
        any::<u128>().prop_map(|n| ExtValue::from(Uuid::from_u128(n))),
    ]
}

fn arb_value() -> impl Strategy<Value = ExtValue> {
    arb_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(ExtValue::Array),
            vec(("[a-z]{1,6}", inner.clone()), 0..4).prop_map(|entries| ExtValue::object(entries)),
            vec(inner, 0..4).prop_map(|items| ExtValue::Set(items.into_iter().collect::<ValueSet>())),
        ]
    })
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::Array),
            vec(("[a-z]{1,4}", inner), 0..4).prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn arb_json_object() -> impl Strategy<Value = Map<String, Value>> {
    vec(("[a-z]{1,4}", arb_json()), 0..6).prop_map(|entries| entries.into_iter().collect())
}

fn roundtrip(value: &ExtValue) -> ExtValue {
    let text = encode(value, &EncodeOptions::default()).unwrap();
    decode(&text, &DecodeOptions::strict()).unwrap()
}

// ── Conversion properties ────────────────────────────────────────

proptest! {
    #[test]
    fn encode_decode_roundtrip(value in arb_value()) {
        prop_assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn decode_encode_is_idempotent(value in arb_value()) {
        let once = roundtrip(&value);
        let twice = roundtrip(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn sorted_and_pretty_text_decode_to_the_same_value(value in arb_value()) {
        let options = EncodeOptions::default().with_pretty(true).with_sort_keys(true).with_ensure_ascii(false);
        let text = encode(&value, &options).unwrap();
        prop_assert_eq!(decode(&text, &DecodeOptions::default()).unwrap(), value);
    }
}

// ── Merge properties ─────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_with_itself_is_identity(object in arb_json_object()) {
        let value = ExtValue::from(Value::Object(object));
        prop_assert_eq!(merge(&value, &value, true).unwrap(), value.clone());
        prop_assert_eq!(merge(&value, &value, false).unwrap(), value);
    }

    #[test]
    fn disjoint_keys_merge_to_the_union(left in arb_json_object(), right in arb_json_object()) {
        let left: Map<String, Value> = left.into_iter().map(|(k, v)| (format!("l_{k}"), v)).collect();
        let right: Map<String, Value> = right.into_iter().map(|(k, v)| (format!("r_{k}"), v)).collect();
        let mut union = left.clone();
        union.extend(right.clone());

        let merged = merge_json(&Value::Object(left), &Value::Object(right), true);
        prop_assert_eq!(merged, Value::Object(union));
    }

    #[test]
    fn update_values_win(base in arb_json_object(), update in arb_json_object()) {
        let merged = merge_json(&Value::Object(base.clone()), &Value::Object(update.clone()), false);
        let merged = merged.as_object().unwrap();
        for (key, value) in &update {
            prop_assert_eq!(merged.get(key), Some(value));
        }
        for key in base.keys() {
            prop_assert!(merged.contains_key(key));
        }
    }

    #[test]
    fn merge_agrees_with_merge_json(base in arb_json_object(), update in arb_json_object(), deep in any::<bool>()) {
        let base = Value::Object(base);
        let update = Value::Object(update);
        let plain = merge_json(&base, &update, deep);
        let ext = merge(&ExtValue::from(base), &ExtValue::from(update), deep).unwrap();
        prop_assert_eq!(ext, ExtValue::from(plain));
    }
}
