//! Decoding of MySQL rows into JSON records, column by column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use restsql_data::Record;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};

/// Decode every column of `row` by its reported type.
pub(crate) fn decode_row(row: &MySqlRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "NULL" => Value::Null,
        "BOOLEAN" => scalar(row.try_get::<Option<bool>, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            scalar(row.try_get::<Option<i64>, _>(idx)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => scalar(row.try_get::<Option<u64>, _>(idx)?),
        "YEAR" => scalar(row.try_get_unchecked::<Option<u16>, _>(idx)?),
        "BIT" => row
            .try_get_unchecked::<Option<Vec<u8>>, _>(idx)?
            .map(|bytes| Value::from(bit_value(&bytes)))
            .unwrap_or_default(),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|f| Value::from(f64::from(f)))
            .unwrap_or_default(),
        "DOUBLE" => scalar(row.try_get::<Option<f64>, _>(idx)?),
        // Kept as text so no precision is lost.
        "DECIMAL" => text(row.try_get::<Option<Decimal>, _>(idx)?),
        "DATE" => text(row.try_get::<Option<NaiveDate>, _>(idx)?),
        "TIME" => text(row.try_get::<Option<NaiveTime>, _>(idx)?),
        "DATETIME" => text(row.try_get::<Option<NaiveDateTime>, _>(idx)?),
        "TIMESTAMP" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|ts| Value::String(ts.to_rfc3339()))
            .unwrap_or_default(),
        // Handed back as text: unflatten is the only place stored JSON is parsed.
        "JSON" => row
            .try_get::<Option<Value>, _>(idx)?
            .map(json_text)
            .unwrap_or_default(),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
            .unwrap_or_default(),
        "GEOMETRY" => row
            .try_get_unchecked::<Option<Vec<u8>>, _>(idx)?
            .map(|bytes| Value::String(hex(&bytes)))
            .unwrap_or_default(),
        _ => scalar(row.try_get::<Option<String>, _>(idx)?),
    };
    Ok(value)
}

fn scalar<T>(value: Option<T>) -> Value
where
    Value: From<T>,
{
    value.map(Value::from).unwrap_or_default()
}

fn text<T: ToString>(value: Option<T>) -> Value {
    value
        .map(|v| Value::String(v.to_string()))
        .unwrap_or_default()
}

fn json_text(value: Value) -> Value {
    Value::String(value.to_string())
}

/// BIT(n) arrives big-endian, at most eight bytes.
fn bit_value(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, b| (acc << 8) | u64::from(*b))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
