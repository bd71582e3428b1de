//! Conversion between structured field values and their storage encoding.
//!
//! Values never get spliced into SQL text: [`flatten`] yields a [`SqlValue`]
//! that the backend binds as a statement parameter. Composite and array
//! values travel as JSON text and are parsed back by [`unflatten`].

use serde_json::{Map, Value};

use crate::error::DataError;
use crate::model::{ModelDescriptor, Property};

/// A driver-native statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::UInt(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// Convert a field value into the parameter stored for `property`.
///
/// Structured kinds (composite, arrays) become their JSON text. Scalar kinds
/// take the value's own scalar form; handing them an array or object is a
/// bad request.
pub fn flatten(property: &Property, value: &Value) -> Result<SqlValue, DataError> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }
    if property.kind().is_structured() {
        return serde_json::to_string(value)
            .map(SqlValue::Text)
            .map_err(|e| DataError::Other(format!("cannot encode '{}': {e}", property.name())));
    }
    match value {
        Value::Bool(b) => Ok(SqlValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(SqlValue::UInt(u))
            } else {
                n.as_f64().map(SqlValue::Float).ok_or_else(|| {
                    DataError::BadRequest(format!(
                        "field '{}' holds an unrepresentable number",
                        property.name()
                    ))
                })
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(DataError::BadRequest(format!(
            "field '{}' expects a scalar value",
            property.name()
        ))),
        Value::Null => Ok(SqlValue::Null),
    }
}

/// Parse the stored JSON text of every structured property of `record` in place.
///
/// Primitive and reference columns, empty strings, nulls and values the
/// driver already decoded into structure are left as they are.
pub fn unflatten(
    model: &ModelDescriptor,
    record: &mut Map<String, Value>,
) -> Result<(), DataError> {
    for property in model.properties() {
        if !property.kind().is_structured() {
            continue;
        }
        let Some(Value::String(raw)) = record.get(property.name()) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let parsed: Value = serde_json::from_str(raw).map_err(|e| {
            DataError::Other(format!(
                "stored value of {}.{} is not valid JSON: {e}",
                model.name(),
                property.name()
            ))
        })?;
        record.insert(property.name().to_string(), parsed);
    }
    Ok(())
}
