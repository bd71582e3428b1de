use std::collections::HashMap;

use crate::marshal::SqlValue;

/// Route parameter carrying a single entity's identity.
pub const ID_PARAM: &str = "id";

/// What the dispatcher knows about the current request.
///
/// # Example
///
/// ```ignore
/// let ctx = RequestContext::new()
///     .with_id("7")
///     .with_filter(Filter::new().where_eq("status", "open"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub route_params: HashMap<String, String>,
    pub filter: Option<Filter>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.insert(name.into(), value.into());
        self
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_param(ID_PARAM, id)
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The raw `id` route parameter, if the route has one.
    pub fn route_id(&self) -> Option<&str> {
        self.route_params.get(ID_PARAM).map(String::as_str)
    }
}

/// A conjunction of typed conditions on declared columns.
///
/// Values are always bound as statement parameters. Column names are checked
/// against the model when the predicate is built.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub(crate) conditions: Vec<Condition>,
}

#[derive(Debug, Clone)]
pub(crate) enum Condition {
    Eq(String, SqlValue),
    NotEq(String, SqlValue),
    Like(String, String),
    Gt(String, SqlValue),
    Lt(String, SqlValue),
    In(String, Vec<SqlValue>),
    IsNull(String),
    IsNotNull(String),
}

impl Condition {
    pub(crate) fn column(&self) -> &str {
        match self {
            Condition::Eq(col, _)
            | Condition::NotEq(col, _)
            | Condition::Like(col, _)
            | Condition::Gt(col, _)
            | Condition::Lt(col, _)
            | Condition::In(col, _)
            | Condition::IsNull(col)
            | Condition::IsNotNull(col) => col,
        }
    }
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn where_not_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::NotEq(column.to_string(), value.into()));
        self
    }

    pub fn where_like(mut self, column: &str, pattern: &str) -> Self {
        self.conditions
            .push(Condition::Like(column.to_string(), pattern.to_string()));
        self
    }

    pub fn where_gt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Gt(column.to_string(), value.into()));
        self
    }

    pub fn where_lt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Lt(column.to_string(), value.into()));
        self
    }

    pub fn where_in<V: Into<SqlValue>>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn where_null(mut self, column: &str) -> Self {
        self.conditions.push(Condition::IsNull(column.to_string()));
        self
    }

    pub fn where_not_null(mut self, column: &str) -> Self {
        self.conditions
            .push(Condition::IsNotNull(column.to_string()));
        self
    }
}
