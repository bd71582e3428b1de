use restsql_data::DataError;
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::mysql::MySqlDatabaseError;

/// MySQL server error numbers that signal a rejected row rather than a broken
/// backend.
///
/// - 1048 `ER_BAD_NULL_ERROR`: column cannot be null
/// - 1062 `ER_DUP_ENTRY`: duplicate entry for a unique key
/// - 1364 `ER_NO_DEFAULT_FOR_FIELD`: required field has neither value nor default
/// - 1366 `ER_TRUNCATED_WRONG_VALUE_FOR_FIELD`: incorrect value for column
/// - 1406 `ER_DATA_TOO_LONG`
/// - 1451 / 1452: foreign key constraint on delete / insert
/// - 3819 `ER_CHECK_CONSTRAINT_VIOLATED`
pub const CONSTRAINT_ERROR_NUMBERS: &[u16] = &[1048, 1062, 1364, 1366, 1406, 1451, 1452, 3819];

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Instead, use `.into_data_error()`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".into()),
            sqlx::Error::Database(db_err) if is_constraint_violation(db_err.as_ref()) => {
                DataError::BadRequest(db_err.message().to_string())
            }
            _ => DataError::database(self),
        }
    }
}

/// Whether a server error reports a violated constraint.
pub fn is_constraint_violation(err: &(dyn DatabaseError + 'static)) -> bool {
    if let Some(mysql) = err.try_downcast_ref::<MySqlDatabaseError>() {
        if CONSTRAINT_ERROR_NUMBERS.contains(&mysql.number()) {
            return true;
        }
    }
    matches!(
        err.kind(),
        ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation
    )
}
