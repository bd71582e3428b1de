//! SQL text synthesis for a single model.
//!
//! Statements use MySQL syntax with `?` placeholders and backtick-quoted
//! identifiers. Field values and filter operands are always bound; the only
//! values rendered into the text are integer identities.
//!
//! # Example
//!
//! ```ignore
//! let qb = QueryBuilder::new(&model);
//! let predicate = qb.build_one_where(&ctx, true)?;
//! let stmt = qb.build_select(predicate, true);
//! // SELECT * FROM `Todo` WHERE (`status` = ?) AND (id=7) LIMIT 0,1
//! ```

use crate::context::{Condition, Filter, RequestContext};
use crate::entity::Entity;
use crate::error::DataError;
use crate::marshal::{flatten, SqlValue};
use crate::model::{ModelDescriptor, IDENTITY_FIELD};

/// SQL text plus the parameters bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn unconditional() -> Self {
        Self::new("TRUE")
    }

    /// `(self) AND (other)`, keeping both parameter lists in placeholder order.
    fn and(self, other: Statement) -> Self {
        let mut params = self.params;
        params.extend(other.params);
        Self {
            sql: format!("({}) AND ({})", self.sql, other.sql),
            params,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'m> {
    model: &'m ModelDescriptor,
}

impl<'m> QueryBuilder<'m> {
    pub fn new(model: &'m ModelDescriptor) -> Self {
        Self { model }
    }

    /// Predicate for multi-row operations.
    ///
    /// With an identity list the predicate is `id IN (...)`, conjoined with the
    /// caller's filter when one is present. Without either it is `TRUE`.
    pub fn build_where(
        &self,
        ctx: &RequestContext,
        ids: Option<&[i64]>,
    ) -> Result<Statement, DataError> {
        let filter = self.build_filter(ctx.filter.as_ref())?;
        let identities = ids.map(identity_list);
        Ok(match (identities, filter) {
            (Some(ids), Some(filter)) => ids.and(filter),
            (Some(ids), None) => ids,
            (None, Some(filter)) => filter,
            (None, None) => Statement::unconditional(),
        })
    }

    /// Predicate for single-row operations.
    ///
    /// A route `id` that does not parse as an integer fails with `NotFound`
    /// before any statement exists.
    pub fn build_one_where(
        &self,
        ctx: &RequestContext,
        apply_filter: bool,
    ) -> Result<Statement, DataError> {
        let filter = if apply_filter {
            self.build_filter(ctx.filter.as_ref())?
        } else {
            None
        };
        let identity = match ctx.route_id() {
            Some(raw) => Some(identity_eq(parse_identity(raw)?)),
            None => None,
        };
        Ok(match (filter, identity) {
            (Some(filter), Some(identity)) => filter.and(identity),
            (None, Some(identity)) => identity,
            (Some(filter), None) => filter,
            (None, None) => Statement::unconditional(),
        })
    }

    /// Assignment list for every declared property the entity defines.
    ///
    /// Undefined properties are skipped; explicit nulls and falsy values are not.
    /// The result is empty when the entity defines nothing.
    pub fn build_set(&self, entity: &Entity) -> Result<Statement, DataError> {
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for property in self.model.properties() {
            let Some(value) = entity.get(property.name()) else {
                continue;
            };
            params.push(flatten(property, value)?);
            assignments.push(format!("{}=?", quote_identifier(property.name())));
        }
        Ok(Statement {
            sql: assignments.join(", "),
            params,
        })
    }

    pub fn build_select(&self, predicate: Statement, limit_one: bool) -> Statement {
        let mut sql = format!("SELECT * FROM {} WHERE {}", self.table(), predicate.sql);
        if limit_one {
            sql.push_str(" LIMIT 0,1");
        }
        Statement {
            sql,
            params: predicate.params,
        }
    }

    /// `INSERT ... SET`, or the default-values form when nothing is assigned.
    pub fn build_insert(&self, set: Statement) -> Statement {
        if set.sql.is_empty() {
            return Statement::new(format!("INSERT {} VALUES()", self.table()));
        }
        Statement {
            sql: format!("INSERT {} SET {}", self.table(), set.sql),
            params: set.params,
        }
    }

    pub fn build_update(&self, set: Statement, id: i64) -> Statement {
        Statement {
            sql: format!("UPDATE {} SET {} WHERE id={id}", self.table(), set.sql),
            params: set.params,
        }
    }

    pub fn build_delete(&self, predicate: Statement) -> Statement {
        Statement {
            sql: format!("DELETE FROM {} WHERE {}", self.table(), predicate.sql),
            params: predicate.params,
        }
    }

    fn table(&self) -> String {
        quote_identifier(self.model.name())
    }

    fn build_filter(&self, filter: Option<&Filter>) -> Result<Option<Statement>, DataError> {
        let Some(filter) = filter.filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        let mut clauses = Vec::with_capacity(filter.conditions.len());
        let mut params = Vec::new();
        for cond in &filter.conditions {
            let col = self.checked_column(cond.column())?;
            let clause = match cond {
                Condition::Eq(_, val) => {
                    params.push(val.clone());
                    format!("{col} = ?")
                }
                Condition::NotEq(_, val) => {
                    params.push(val.clone());
                    format!("{col} != ?")
                }
                Condition::Like(_, pat) => {
                    params.push(SqlValue::Text(pat.clone()));
                    format!("{col} LIKE ?")
                }
                Condition::Gt(_, val) => {
                    params.push(val.clone());
                    format!("{col} > ?")
                }
                Condition::Lt(_, val) => {
                    params.push(val.clone());
                    format!("{col} < ?")
                }
                Condition::In(_, vals) if vals.is_empty() => "FALSE".to_string(),
                Condition::In(_, vals) => {
                    let placeholders = vec!["?"; vals.len()];
                    params.extend(vals.iter().cloned());
                    format!("{col} IN ({})", placeholders.join(", "))
                }
                Condition::IsNull(_) => format!("{col} IS NULL"),
                Condition::IsNotNull(_) => format!("{col} IS NOT NULL"),
            };
            clauses.push(clause);
        }
        Ok(Some(Statement {
            sql: clauses.join(" AND "),
            params,
        }))
    }

    fn checked_column(&self, column: &str) -> Result<String, DataError> {
        if column == IDENTITY_FIELD || self.model.property(column).is_some() {
            Ok(quote_identifier(column))
        } else {
            Err(DataError::BadRequest(format!(
                "unknown column '{column}' on {}",
                self.model.name()
            )))
        }
    }
}

/// Parse a caller-supplied identity. Anything but an integer is `NotFound`.
pub fn parse_identity(raw: &str) -> Result<i64, DataError> {
    raw.parse::<i64>()
        .map_err(|_| DataError::NotFound(format!("no entity with id '{raw}'")))
}

fn identity_eq(id: i64) -> Statement {
    Statement::new(format!("id={id}"))
}

fn identity_list(ids: &[i64]) -> Statement {
    if ids.is_empty() {
        return Statement::new("FALSE");
    }
    let list: Vec<String> = ids.iter().map(i64::to_string).collect();
    Statement::new(format!("id IN ({})", list.join(", ")))
}

pub(crate) fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str) -> String {
    format!("`{ident}`")
}
