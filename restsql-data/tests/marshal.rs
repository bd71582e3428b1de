mod common;

use common::{sample_meta, todo_model};
use restsql_data::marshal::{flatten, unflatten};
use restsql_data::{DataError, SqlValue};
use serde_json::{json, Map, Value};

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn test_flatten_scalars() {
    let model = todo_model();
    let title = model.property("title").unwrap();
    let done = model.property("done").unwrap();
    let priority = model.property("priority").unwrap();

    assert_eq!(flatten(title, &json!("Ann")).unwrap(), SqlValue::Text("Ann".into()));
    assert_eq!(flatten(done, &json!(true)).unwrap(), SqlValue::Bool(true));
    assert_eq!(flatten(priority, &json!(3)).unwrap(), SqlValue::Int(3));
    assert_eq!(flatten(priority, &json!(2.5)).unwrap(), SqlValue::Float(2.5));
    assert_eq!(flatten(priority, &json!(u64::MAX)).unwrap(), SqlValue::UInt(u64::MAX));
    assert_eq!(flatten(title, &Value::Null).unwrap(), SqlValue::Null);
}

#[test]
fn test_flatten_structured_values_to_json_text() {
    let model = todo_model();
    let meta = model.property("meta").unwrap();
    let tags = model.property("tags").unwrap();

    assert_eq!(
        flatten(meta, &json!({ "quote": "say \"hi\"" })).unwrap(),
        SqlValue::Text(r#"{"quote":"say \"hi\""}"#.into())
    );
    assert_eq!(
        flatten(tags, &json!(["a", "b"])).unwrap(),
        SqlValue::Text(r#"["a","b"]"#.into())
    );
}

#[test]
fn test_flatten_rejects_structure_on_scalar_field() {
    let model = todo_model();
    let title = model.property("title").unwrap();
    let err = flatten(title, &json!({ "nested": 1 })).unwrap_err();
    assert!(matches!(err, DataError::BadRequest(_)));
}

#[test]
fn test_unflatten_parses_structured_columns_only() {
    let model = todo_model();
    let mut row = record(json!({
        "id": 1,
        "title": "[\"not\", \"parsed\"]",
        "meta": "{\"a\":1}",
        "checklist": "[{\"step\":\"one\",\"done\":false}]",
        "tags": "[\"x\"]",
        "owner": 12,
    }));
    unflatten(&model, &mut row).unwrap();

    assert_eq!(row["title"], json!("[\"not\", \"parsed\"]"));
    assert_eq!(row["meta"], json!({ "a": 1 }));
    assert_eq!(row["checklist"], json!([{ "step": "one", "done": false }]));
    assert_eq!(row["tags"], json!(["x"]));
    assert_eq!(row["owner"], json!(12));
}

#[test]
fn test_unflatten_leaves_falsy_and_absent_values_untouched() {
    let model = todo_model();
    let mut row = record(json!({ "id": 1, "meta": "", "checklist": null }));
    unflatten(&model, &mut row).unwrap();
    assert_eq!(row["meta"], json!(""));
    assert_eq!(row["checklist"], Value::Null);
    assert!(!row.contains_key("tags"));
}

#[test]
fn test_unflatten_keeps_values_the_driver_already_decoded() {
    let model = todo_model();
    let mut row = record(json!({ "id": 1, "meta": { "already": "structured" } }));
    unflatten(&model, &mut row).unwrap();
    assert_eq!(row["meta"], json!({ "already": "structured" }));
}

#[test]
fn test_unflatten_reports_corrupt_json_as_internal() {
    let model = todo_model();
    let mut row = record(json!({ "id": 1, "meta": "{broken" }));
    let err = unflatten(&model, &mut row).unwrap_err();
    assert_eq!(err.kind(), restsql_data::ErrorKind::Internal);
}

#[test]
fn test_structured_values_survive_storage() {
    let model = todo_model();
    let cases = [
        ("meta", sample_meta()),
        ("meta", json!({})),
        ("meta", json!("just a string")),
        ("checklist", json!([{ "step": "one" }, { "step": "two", "tags": ["\"quoted\""] }])),
        ("checklist", json!([])),
    ];
    for (field, value) in cases {
        let property = model.property(field).unwrap();
        let SqlValue::Text(stored) = flatten(property, &value).unwrap() else {
            panic!("{field} should be stored as text");
        };
        let mut row = Map::new();
        row.insert(field.to_string(), Value::String(stored));
        unflatten(&model, &mut row).unwrap();
        assert_eq!(row[field], value, "{field} did not survive storage");
    }
}
