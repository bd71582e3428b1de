#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use restsql_data::{
    Backend, DataError, ExecOutcome, FieldKind, IntoDataError, ModelDescriptor, PrimitiveType,
    PropertyConfig, PropertyDescriptor, Record, Statement,
};
use serde_json::{json, Value};

/// Failures a fake driver can raise.
#[derive(Debug, Clone)]
pub enum FakeError {
    /// The server refused an insert because a required column has no default.
    MissingDefault(String),
    /// Anything the mapper does not recognise.
    Unrecognised(String),
    /// A failure that already carries a domain kind.
    NotFound(String),
}

impl IntoDataError for FakeError {
    fn into_data_error(self) -> DataError {
        match self {
            FakeError::MissingDefault(col) => {
                DataError::BadRequest(format!("Field '{col}' doesn't have a default value"))
            }
            FakeError::NotFound(msg) => DataError::NotFound(msg),
            FakeError::Unrecognised(msg) => DataError::database(std::io::Error::other(msg)),
        }
    }
}

/// Backend double that records every statement and replays scripted results.
#[derive(Default)]
pub struct RecordingBackend {
    statements: Mutex<Vec<Statement>>,
    rows: Mutex<VecDeque<Vec<Record>>>,
    outcomes: Mutex<VecDeque<ExecOutcome>>,
    failure: Mutex<Option<FakeError>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: Vec<Value>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| match row {
                Value::Object(map) => map,
                other => panic!("row must be an object, got {other}"),
            })
            .collect();
        self.rows.lock().unwrap().push_back(records);
        self
    }

    pub fn with_generated_id(self, id: u64) -> Self {
        self.outcomes.lock().unwrap().push_back(ExecOutcome {
            rows_affected: 1,
            generated_id: Some(id),
        });
        self
    }

    pub fn failing(self, err: FakeError) -> Self {
        *self.failure.lock().unwrap() = Some(err);
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements().into_iter().map(|s| s.sql).collect()
    }

    fn record(&self, stmt: &Statement) -> Result<(), FakeError> {
        self.statements.lock().unwrap().push(stmt.clone());
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Backend for RecordingBackend {
    type Error = FakeError;

    async fn fetch_all(&self, stmt: &Statement) -> Result<Vec<Record>, FakeError> {
        self.record(stmt)?;
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute(&self, stmt: &Statement) -> Result<ExecOutcome, FakeError> {
        self.record(stmt)?;
        Ok(self.outcomes.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub fn todo_model() -> ModelDescriptor {
    ModelDescriptor::new(
        "Todo",
        vec![
            PropertyDescriptor::new(
                "title",
                FieldKind::Primitive(PrimitiveType::Text),
                PropertyConfig::new().required(),
            ),
            PropertyDescriptor::new(
                "done",
                FieldKind::Primitive(PrimitiveType::Boolean),
                PropertyConfig::new().default_value(false),
            ),
            PropertyDescriptor::new(
                "priority",
                FieldKind::Primitive(PrimitiveType::Numeric),
                PropertyConfig::new()
                    .validator(|v| v.as_i64().is_some_and(|p| (0..=5).contains(&p))),
            ),
            PropertyDescriptor::new(
                "status",
                FieldKind::Primitive(PrimitiveType::Text),
                PropertyConfig::new().enum_values(["open", "closed"]),
            ),
            PropertyDescriptor::new(
                "tags",
                FieldKind::array_of(FieldKind::Primitive(PrimitiveType::Text)),
                PropertyConfig::new(),
            ),
            PropertyDescriptor::new(
                "checklist",
                FieldKind::array_of(FieldKind::Composite),
                PropertyConfig::new(),
            ),
            PropertyDescriptor::new("meta", FieldKind::Composite, PropertyConfig::new()),
            PropertyDescriptor::new(
                "owner",
                FieldKind::Reference,
                PropertyConfig::new().reference(),
            ),
        ],
    )
    .unwrap()
}

pub fn sample_meta() -> Value {
    json!({ "source": "import", "labels": ["a", "b"], "weight": 1.5, "nested": { "ok": true } })
}
