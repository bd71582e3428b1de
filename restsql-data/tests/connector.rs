mod common;

use common::{sample_meta, todo_model, FakeError, RecordingBackend};
use restsql_data::{
    Connector, DataError, Entity, EntityState, ErrorKind, Filter, RequestContext, SqlConnector,
    SqlValue,
};
use serde_json::{json, Map};

fn persisted(id: i64) -> Entity {
    Entity::with_identity(id, Map::new())
}

#[tokio::test]
async fn test_find_returns_rows_in_backend_order() {
    let model = todo_model();
    let backend = RecordingBackend::new().with_rows(vec![
        json!({ "id": 2, "title": "second", "meta": "{\"k\":1}" }),
        json!({ "id": 1, "title": "first", "meta": null }),
    ]);
    let connector = SqlConnector::new(backend);

    let todos = connector.find(&model, &RequestContext::new()).await.unwrap();

    assert_eq!(connector.backend().sql(), vec!["SELECT * FROM `Todo` WHERE TRUE"]);
    let ids: Vec<_> = todos.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![Some(2), Some(1)]);
    assert_eq!(todos[0].get("meta"), Some(&json!({ "k": 1 })));
    assert_eq!(todos[1].get("meta"), Some(&json!(null)));
    assert!(todos.iter().all(|t| t.state() == EntityState::Persisted));
}

#[tokio::test]
async fn test_find_binds_filter_values() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let ctx = RequestContext::new().with_filter(Filter::new().where_eq("status", "open"));

    let todos = connector.find(&model, &ctx).await.unwrap();

    assert!(todos.is_empty());
    let stmt = &connector.backend().statements()[0];
    assert_eq!(stmt.sql, "SELECT * FROM `Todo` WHERE `status` = ?");
    assert_eq!(stmt.params, vec![SqlValue::Text("open".into())]);
}

#[tokio::test]
async fn test_find_one_returns_single_row() {
    let model = todo_model();
    let backend = RecordingBackend::new().with_rows(vec![json!({
        "id": 7,
        "title": "Ann",
        "checklist": "[{\"step\":\"a\"}]",
    })]);
    let connector = SqlConnector::new(backend);

    let todo = connector
        .find_one(&model, &RequestContext::new().with_id("7"), true)
        .await
        .unwrap();

    assert_eq!(
        connector.backend().sql(),
        vec!["SELECT * FROM `Todo` WHERE id=7 LIMIT 0,1"]
    );
    assert_eq!(todo.id(), Some(7));
    assert_eq!(todo.get("title"), Some(&json!("Ann")));
    assert_eq!(todo.get("checklist"), Some(&json!([{ "step": "a" }])));
    assert!(todo.get("id").is_none());
}

#[tokio::test]
async fn test_find_one_without_match_is_not_found() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());

    let err = connector
        .find_one(&model, &RequestContext::new().with_id("8"), true)
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::NotFound(_)));
    assert_eq!(connector.backend().statements().len(), 1);
}

#[tokio::test]
async fn test_find_one_with_malformed_id_never_reaches_backend() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());

    let err = connector
        .find_one(&model, &RequestContext::new().with_id("abc"), true)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(connector.backend().statements().is_empty());
}

#[tokio::test]
async fn test_create_performs_no_io_and_seeds_defaults() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());

    let todo = connector.create(&model, &RequestContext::new()).await.unwrap();

    assert!(connector.backend().statements().is_empty());
    assert!(todo.is_transient());
    assert_eq!(todo.id(), None);
    assert_eq!(todo.get("done"), Some(&json!(false)));
    assert!(!todo.is_defined("title"));
}

#[tokio::test]
async fn test_save_transient_assigns_generated_identity() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new().with_generated_id(42));
    let mut todo = connector.create(&model, &RequestContext::new()).await.unwrap();
    todo.set("title", "Ann");

    connector.save(&model, &mut todo).await.unwrap();

    let statements = connector.backend().statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].sql, "INSERT `Todo` SET `title`=?, `done`=?");
    assert_eq!(
        statements[0].params,
        vec![SqlValue::Text("Ann".into()), SqlValue::Bool(false)]
    );
    assert_eq!(todo.id(), Some(42));
    assert_eq!(todo.state(), EntityState::Persisted);
}

#[tokio::test]
async fn test_save_transient_without_fields_uses_default_values_form() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new().with_generated_id(5));

    let mut todo = Entity::transient();

    connector.save(&model, &mut todo).await.unwrap();

    assert_eq!(connector.backend().sql(), vec!["INSERT `Todo` VALUES()"]);
    assert_eq!(todo.id(), Some(5));
}

#[tokio::test]
async fn test_save_transient_without_generated_identity_fails() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let mut todo = Entity::transient();
    todo.set("title", "Ann");

    let err = connector.save(&model, &mut todo).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(todo.is_transient());
}

#[tokio::test]
async fn test_save_persisted_issues_single_update() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let mut todo = persisted(7);
    todo.set("title", "renamed").set("meta", sample_meta());

    connector.save(&model, &mut todo).await.unwrap();

    let statements = connector.backend().statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].sql,
        "UPDATE `Todo` SET `title`=?, `meta`=? WHERE id=7"
    );
    assert!(!statements[0].sql.contains("INSERT"));
    assert_eq!(todo.id(), Some(7));
}

#[tokio::test]
async fn test_save_persisted_without_defined_fields_skips_update() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());

    let mut todo = persisted(7);

    connector.save(&model, &mut todo).await.unwrap();

    assert!(connector.backend().statements().is_empty());
    assert_eq!(todo.id(), Some(7));
}

#[tokio::test]
async fn test_save_rejects_enum_and_validator_violations() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());

    let mut todo = persisted(1);
    todo.set("status", "archived");
    let err = connector.save(&model, &mut todo).await.unwrap_err();
    assert!(matches!(err, DataError::BadRequest(_)));

    let mut todo = persisted(1);
    todo.set("priority", 9);
    let err = connector.save(&model, &mut todo).await.unwrap_err();
    assert!(matches!(err, DataError::BadRequest(_)));

    assert!(connector.backend().statements().is_empty());
}

#[tokio::test]
async fn test_rejected_save_leaves_entity_usable() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new().with_generated_id(11));
    let mut todo = connector.create(&model, &RequestContext::new()).await.unwrap();
    todo.set("title", "Ann").set("status", "archived");

    let err = connector.save(&model, &mut todo).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert!(todo.is_transient());
    assert_eq!(todo.get("title"), Some(&json!("Ann")));

    todo.set("status", "open");
    connector.save(&model, &mut todo).await.unwrap();

    assert_eq!(todo.id(), Some(11));
    assert_eq!(connector.backend().statements().len(), 1);
}

#[tokio::test]
async fn test_save_maps_missing_default_to_bad_request() {
    let model = todo_model();
    let backend = RecordingBackend::new().failing(FakeError::MissingDefault("title".into()));
    let connector = SqlConnector::new(backend);

    let err = connector
        .save(&model, &mut Entity::transient())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_unrecognised_backend_failure_is_internal() {
    let model = todo_model();
    let backend = RecordingBackend::new().failing(FakeError::Unrecognised("syntax".into()));
    let connector = SqlConnector::new(backend);

    let err = connector.find(&model, &RequestContext::new()).await.unwrap_err();

    assert!(matches!(err, DataError::Database(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test]
async fn test_typed_backend_failure_is_not_rewrapped() {
    let model = todo_model();
    let backend = RecordingBackend::new().failing(FakeError::NotFound("gone".into()));
    let connector = SqlConnector::new(backend);

    let err = connector.find(&model, &RequestContext::new()).await.unwrap_err();

    assert!(matches!(err, DataError::NotFound(msg) if msg == "gone"));
}

#[tokio::test]
async fn test_delete_one_targets_identity_and_removes_entity() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let mut todo = persisted(3);

    connector.delete_one(&model, &mut todo).await.unwrap();

    assert_eq!(connector.backend().sql(), vec!["DELETE FROM `Todo` WHERE id IN (3)"]);
    assert_eq!(todo.state(), EntityState::Removed);
}

#[tokio::test]
async fn test_delete_empty_list_issues_no_statement() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());

    connector.delete(&model, &mut []).await.unwrap();

    assert!(connector.backend().statements().is_empty());
}

#[tokio::test]
async fn test_delete_many_issues_single_statement() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let mut todos = vec![persisted(1), persisted(2)];

    connector.delete(&model, &mut todos).await.unwrap();

    assert_eq!(
        connector.backend().sql(),
        vec!["DELETE FROM `Todo` WHERE id IN (1, 2)"]
    );
    assert!(todos.iter().all(|t| t.state() == EntityState::Removed));
}

#[tokio::test]
async fn test_removed_entity_cannot_be_saved_again() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let mut todo = persisted(3);
    connector.delete_one(&model, &mut todo).await.unwrap();

    todo.set("title", "back from the dead");
    let err = connector.save(&model, &mut todo).await.unwrap_err();

    assert!(matches!(err, DataError::BadRequest(_)));
    assert_eq!(connector.backend().statements().len(), 1);
}

#[tokio::test]
async fn test_deleting_unsaved_entity_is_not_found() {
    let model = todo_model();
    let connector = SqlConnector::new(RecordingBackend::new());
    let mut todo = Entity::transient();

    let err = connector.delete_one(&model, &mut todo).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(connector.backend().statements().is_empty());
}
