use chrono::NaiveDate;
use extjson_codec::{
    ConvertError, Converter, DecodeOptions, EncodeOptions, ExtValue, TypeRegistry, read_from_file, write_to_file,
};
use extjson_types::{SharedValue, ValueSet};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sample() -> ExtValue {
    ExtValue::object([
        ("name", ExtValue::from("Zoë")),
        ("id", ExtValue::from(Uuid::new_v4())),
        ("since", ExtValue::from(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())),
        ("tags", ExtValue::from(["a", "b"].into_iter().collect::<ValueSet>())),
    ])
}

// ── Write then read ──────────────────────────────────────────────

#[test]
fn file_roundtrip() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");

    write_to_file(&sample_fixed(), &path, &EncodeOptions::for_file()).unwrap();
    let back = read_from_file(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(back, sample_fixed());
}

#[test]
fn file_output_is_pretty_and_ascii_by_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pretty.json");

    write_to_file(&ExtValue::object([("name", ExtValue::from("Zoë"))]), &path, &EncodeOptions::for_file()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "{\n  \"name\": \"Zo\\u00eb\"\n}");
}

#[test]
fn converter_methods_use_their_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.json");
    let registry = TypeRegistry::empty();
    let converter = Converter::new(&registry);

    let err = converter
        .write_to_file(&sample(), &path, &EncodeOptions::for_file())
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedType { .. }));
    assert!(!path.exists());
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn failed_encode_leaves_existing_file_intact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keep.json");
    fs::write(&path, "{\"old\": true}").unwrap();

    let node = SharedValue::new(ExtValue::Null);
    node.set(ExtValue::array([ExtValue::from(node.clone())]));
    let err = write_to_file(&ExtValue::from(node), &path, &EncodeOptions::for_file()).unwrap_err();

    assert!(matches!(err, ConvertError::CyclicReference { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"old\": true}");
}

#[test]
fn missing_file_is_file_access_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let err = read_from_file(&path, &DecodeOptions::default()).unwrap_err();
    match err {
        ConvertError::FileAccess { path: failed, source } => {
            assert_eq!(failed, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unwritable_target_is_file_access_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("out.json");

    let err = write_to_file(&ExtValue::from(1), &path, &EncodeOptions::for_file()).unwrap_err();
    assert!(matches!(err, ConvertError::FileAccess { .. }));
    assert!(err.to_string().starts_with("cannot access "));
}

#[test]
fn malformed_file_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"a\": ").unwrap();

    let err = read_from_file(&path, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedJson { .. }));
}

fn sample_fixed() -> ExtValue {
    let mut value = sample();
    if let ExtValue::Object(map) = &mut value {
        map.insert(
            "id".to_owned(),
            ExtValue::from(Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap()),
        );
    }
    value
}
