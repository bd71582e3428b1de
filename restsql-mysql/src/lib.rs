//! # restsql-mysql: MySQL backend for restsql
//!
//! Runs the statements produced by [`restsql_data::SqlConnector`] against a
//! MySQL server through an [sqlx](https://github.com/launchbadge/sqlx) pool.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxBackend`] | [`Backend`](restsql_data::Backend) over a `MySqlPool` |
//! | [`connect`] | Builds the pool from a [`ConnectorConfig`] and returns a ready connector |
//! | [`ConnectorConfig`] | Pool and logging settings, loaded from YAML, `.env`, and the environment |
//! | [`SqlxErrorExt`] | Converts `sqlx::Error` into `DataError` (`.into_data_error()`) |
//!
//! # Quick start
//!
//! ```ignore
//! use restsql_mysql::{connect, ConnectorConfig};
//! use restsql_data::prelude::*;
//!
//! let connector = connect(&ConnectorConfig::load("dev")?).await?;
//! let mut todo = connector.create(&model, &RequestContext::new()).await?;
//! todo.set("title", "Write docs");
//! connector.save(&model, &mut todo).await?;
//! ```
//!
//! # Error mapping
//!
//! Server errors that report a rejected row (missing default, duplicate key,
//! foreign key or check violation, see [`CONSTRAINT_ERROR_NUMBERS`]) become
//! `DataError::BadRequest`. `RowNotFound` becomes `DataError::NotFound`.
//! Everything else is `DataError::Database`.

mod backend;
pub mod config;
pub mod error;
mod row;

pub use backend::{connect, SqlxBackend};
pub use config::{ConfigError, ConnectorConfig};
pub use error::{is_constraint_violation, SqlxErrorExt, CONSTRAINT_ERROR_NUMBERS};

/// Re-exports of the most commonly used types from both `restsql-data` and this crate.
pub mod prelude {
    pub use crate::{connect, ConnectorConfig, SqlxBackend, SqlxErrorExt};
    pub use restsql_data::prelude::*;
}
