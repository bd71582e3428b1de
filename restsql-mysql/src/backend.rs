use restsql_data::{Backend, DataError, ExecOutcome, Record, SqlConnector, SqlValue, Statement};
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool};
use tracing::info;

use crate::config::ConnectorConfig;
use crate::error::SqlxErrorExt;
use crate::row::decode_row;

/// MySQL [`Backend`] over an `sqlx` connection pool.
///
/// Every statement runs on whichever pooled connection sqlx hands out, so no
/// per-connection session state is relied upon. Generated identities come
/// from the insert acknowledgment itself.
///
/// # Example
///
/// ```ignore
/// let connector = SqlConnector::new(SqlxBackend::new(pool.clone()));
/// ```
#[derive(Debug, Clone)]
pub struct SqlxBackend {
    pool: MySqlPool,
}

impl SqlxBackend {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl Backend for SqlxBackend {
    type Error = DataError;

    async fn fetch_all(&self, stmt: &Statement) -> Result<Vec<Record>, DataError> {
        let rows = bind_all(sqlx::query(&stmt.sql), &stmt.params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.into_data_error())
    }

    async fn execute(&self, stmt: &Statement) -> Result<ExecOutcome, DataError> {
        let result = bind_all(sqlx::query(&stmt.sql), &stmt.params)
            .execute(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            generated_id: Some(result.last_insert_id()).filter(|id| *id != 0),
        })
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::UInt(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

/// Open a pool from `config` and wrap it in a ready connector.
pub async fn connect(config: &ConnectorConfig) -> Result<SqlConnector<SqlxBackend>, DataError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
        .map_err(|e| e.into_data_error())?;
    info!(
        max_connections = config.max_connections,
        "MySQL connector ready"
    );
    Ok(SqlConnector::new(SqlxBackend::new(pool)).log_statements(config.log_statements))
}
