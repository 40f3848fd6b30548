//! Validates contract fixtures and serialized types against frozen JSON schemas.

use jsonschema::JSONSchema;
use photobooth_app::BoothConfig;
use photobooth_frames::{CustomFrameRecord, CustomFrameStore, CustomFrameUpload, FrameLibrary};
use serde_json::Value;
use time::OffsetDateTime;

const RECORD_SCHEMA: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/custom-frame-record.schema.json"
);
const RECORD_FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/fixtures/custom-frame-record.valid.json"
);
const CONFIG_SCHEMA: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/booth-config.schema.json"
);
const CONFIG_FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/fixtures/booth-config.valid.json"
);

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn custom_frame_fixture_matches_schema() {
    let validator = compile_validator(RECORD_SCHEMA);
    let fixture = load_json(RECORD_FIXTURE);
    assert!(
        validator.is_valid(&fixture),
        "custom frame fixture should validate against schema"
    );
}

#[test]
fn custom_frame_fixture_decodes_into_an_overlay() {
    let record: CustomFrameRecord =
        serde_json::from_value(load_json(RECORD_FIXTURE)).expect("fixture should deserialize");
    let bitmap = record.to_bitmap().expect("fixture image should decode");
    assert_eq!((bitmap.width(), bitmap.height()), (1, 1));
    assert_eq!(record.size_bytes, 68);
}

#[test]
fn uploaded_record_matches_schema() {
    let fixture: CustomFrameRecord =
        serde_json::from_value(load_json(RECORD_FIXTURE)).expect("fixture should deserialize");
    let bytes = fixture.to_bitmap().expect("fixture image should decode").to_png().expect("png");

    let store = CustomFrameStore::new(std::env::temp_dir().join(format!(
        "photobooth-contract-{}.json",
        std::process::id()
    )));
    let mut library = FrameLibrary::empty();
    let outcome = library
        .upload_custom(
            &store,
            CustomFrameUpload {
                name: "border.png".to_string(),
                mime_type: "image/png".to_string(),
                bytes,
            },
            OffsetDateTime::UNIX_EPOCH,
        )
        .expect("upload should succeed");
    store.clear().expect("clear should succeed");

    let validator = compile_validator(RECORD_SCHEMA);
    let serialized = serde_json::to_value(&outcome.record).expect("record should serialize");
    assert!(validator.is_valid(&serialized), "uploaded record should validate");
}

#[test]
fn non_image_record_fails_schema() {
    let validator = compile_validator(RECORD_SCHEMA);
    let mut fixture = load_json(RECORD_FIXTURE);
    fixture["mimeType"] = Value::from("text/plain");
    assert!(!validator.is_valid(&fixture));
}

#[test]
fn booth_config_fixture_matches_schema_and_parses() {
    let validator = compile_validator(CONFIG_SCHEMA);
    let fixture = load_json(CONFIG_FIXTURE);
    assert!(validator.is_valid(&fixture), "config fixture should validate");

    let config = BoothConfig::from_json(&fixture.to_string()).expect("fixture should parse");
    assert_eq!(config.slot_count, 4);
    assert!(!config.auto_preview);
}

#[test]
fn default_booth_config_matches_schema() {
    let validator = compile_validator(CONFIG_SCHEMA);
    let serialized = serde_json::to_value(BoothConfig::default()).expect("config should serialize");
    assert!(validator.is_valid(&serialized), "default config should validate");
}

#[test]
fn every_contract_schema_compiles() {
    let contracts = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts");
    let mut compiled = 0;
    for entry in std::fs::read_dir(contracts).expect("contracts dir should be readable") {
        let path = entry.expect("dir entry should be readable").path();
        if path.to_string_lossy().ends_with(".schema.json") {
            let schema = load_json(&path.to_string_lossy());
            assert!(
                JSONSchema::compile(&schema).is_ok(),
                "{} should compile",
                path.display()
            );
            compiled += 1;
        }
    }
    assert_eq!(compiled, 2);
}

#[test]
fn oversized_export_width_fails_schema_and_config() {
    let validator = compile_validator(CONFIG_SCHEMA);
    let mut fixture = load_json(CONFIG_FIXTURE);
    fixture["exportWidth"] = Value::from(4_294_967_295_u64);
    assert!(!validator.is_valid(&fixture));
    assert!(BoothConfig::from_json(&fixture.to_string()).is_err());
}
