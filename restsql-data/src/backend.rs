use std::future::Future;

use serde_json::{Map, Value};

use crate::error::IntoDataError;
use crate::query::Statement;

/// A stored row, keyed by column name.
pub type Record = Map<String, Value>;

/// Acknowledgment of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Identity the backend generated for an insert, if it generated one.
    pub generated_id: Option<u64>,
}

/// A relational backend able to run one self-contained statement at a time.
///
/// Implementations hold no per-operation state: each call carries its own SQL
/// text and bound parameters.
pub trait Backend: Send + Sync {
    type Error: IntoDataError + Send;

    fn fetch_all(
        &self,
        stmt: &Statement,
    ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send;

    fn execute(
        &self,
        stmt: &Statement,
    ) -> impl Future<Output = Result<ExecOutcome, Self::Error>> + Send;
}
