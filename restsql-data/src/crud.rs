use crate::backend::{Backend, ExecOutcome, Record};
use crate::context::RequestContext;
use crate::entity::{Entity, EntityState};
use crate::error::{DataError, IntoDataError};
use crate::marshal::unflatten;
use crate::model::ModelDescriptor;
use crate::query::{QueryBuilder, Statement};
use crate::repository::Connector;
use tracing::{debug, warn};

/// The generic SQL connector.
///
/// Turns each CRUD call into exactly one self-contained statement against
/// `B`, marshals rows back into entities and classifies every backend
/// failure once. Holds no state shared between calls.
///
/// # Example
///
/// ```ignore
/// let connector = SqlConnector::new(SqlxBackend::new(pool.clone()));
/// let todos = connector.find(&todo_model, &RequestContext::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlConnector<B> {
    backend: B,
    log_statements: bool,
}

impl<B: Backend> SqlConnector<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            log_statements: true,
        }
    }

    /// Whether SQL text is included in debug logs.
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Get the underlying backend reference.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn fetch(
        &self,
        model: &ModelDescriptor,
        op: &'static str,
        stmt: Statement,
    ) -> Result<Vec<Record>, DataError> {
        self.trace(model, op, &stmt);
        self.backend
            .fetch_all(&stmt)
            .await
            .map_err(|e| classify(model, op, e))
    }

    async fn exec(
        &self,
        model: &ModelDescriptor,
        op: &'static str,
        stmt: Statement,
    ) -> Result<ExecOutcome, DataError> {
        self.trace(model, op, &stmt);
        self.backend
            .execute(&stmt)
            .await
            .map_err(|e| classify(model, op, e))
    }

    fn trace(&self, model: &ModelDescriptor, op: &'static str, stmt: &Statement) {
        if self.log_statements {
            debug!(
                table = model.name(),
                op,
                sql = %stmt.sql,
                params = stmt.params.len(),
                "executing statement"
            );
        } else {
            debug!(table = model.name(), op, params = stmt.params.len(), "executing statement");
        }
    }
}

impl<B: Backend> Connector for SqlConnector<B> {
    async fn find(
        &self,
        model: &ModelDescriptor,
        ctx: &RequestContext,
    ) -> Result<Vec<Entity>, DataError> {
        let qb = QueryBuilder::new(model);
        let stmt = qb.build_select(qb.build_where(ctx, None)?, false);
        let records = self.fetch(model, "find", stmt).await?;
        records
            .into_iter()
            .map(|record| hydrate(model, record))
            .collect()
    }

    async fn find_one(
        &self,
        model: &ModelDescriptor,
        ctx: &RequestContext,
        apply_filter: bool,
    ) -> Result<Entity, DataError> {
        let qb = QueryBuilder::new(model);
        let stmt = qb.build_select(qb.build_one_where(ctx, apply_filter)?, true);
        let record = self
            .fetch(model, "find_one", stmt)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::NotFound(format!("{} not found", model.name())))?;
        hydrate(model, record)
    }

    async fn create(
        &self,
        model: &ModelDescriptor,
        _ctx: &RequestContext,
    ) -> Result<Entity, DataError> {
        let mut entity = Entity::transient();
        for property in model.properties() {
            if let Some(default) = &property.config().default {
                entity.set(property.name(), default.clone());
            }
        }
        Ok(entity)
    }

    async fn save(&self, model: &ModelDescriptor, entity: &mut Entity) -> Result<(), DataError> {
        let state = entity.state();
        if state == EntityState::Removed {
            return Err(removed(model));
        }
        check_constraints(model, entity)?;
        let qb = QueryBuilder::new(model);
        let set = qb.build_set(entity)?;

        if state == EntityState::Transient {
            let outcome = self.exec(model, "insert", qb.build_insert(set)).await?;
            let id = outcome
                .generated_id
                .filter(|id| *id != 0)
                .and_then(|id| i64::try_from(id).ok())
                .ok_or_else(|| {
                    DataError::Other(format!(
                        "insert into {} did not report a generated identity",
                        model.name()
                    ))
                })?;
            entity.assign_identity(id);
            debug!(table = model.name(), id, "identity assigned");
            return Ok(());
        }

        let id = persisted_id(model, entity)?;
        if set.sql.is_empty() {
            debug!(table = model.name(), id, "no defined fields, update skipped");
            return Ok(());
        }
        self.exec(model, "update", qb.build_update(set, id)).await?;
        Ok(())
    }

    async fn delete_one(
        &self,
        model: &ModelDescriptor,
        entity: &mut Entity,
    ) -> Result<(), DataError> {
        let id = persisted_id(model, entity)?;
        let qb = QueryBuilder::new(model);
        let predicate = qb.build_where(&RequestContext::default(), Some(&[id]))?;
        self.exec(model, "delete_one", qb.build_delete(predicate)).await?;
        entity.mark_removed();
        Ok(())
    }

    async fn delete(
        &self,
        model: &ModelDescriptor,
        entities: &mut [Entity],
    ) -> Result<(), DataError> {
        if entities.is_empty() {
            return Ok(());
        }
        let ids = entities
            .iter()
            .map(|entity| persisted_id(model, entity))
            .collect::<Result<Vec<_>, _>>()?;
        let qb = QueryBuilder::new(model);
        let predicate = qb.build_where(&RequestContext::default(), Some(&ids))?;
        self.exec(model, "delete", qb.build_delete(predicate)).await?;
        for entity in entities.iter_mut() {
            entity.mark_removed();
        }
        Ok(())
    }
}

fn classify<E: IntoDataError>(model: &ModelDescriptor, op: &'static str, err: E) -> DataError {
    let err = err.into_data_error();
    warn!(table = model.name(), op, kind = ?err.kind(), error = %err, "backend call failed");
    err
}

fn hydrate(model: &ModelDescriptor, mut record: Record) -> Result<Entity, DataError> {
    unflatten(model, &mut record)?;
    Entity::from_record(record).ok_or_else(|| {
        DataError::Other(format!("row of {} has no integer identity", model.name()))
    })
}

fn persisted_id(model: &ModelDescriptor, entity: &Entity) -> Result<i64, DataError> {
    match (entity.state(), entity.id()) {
        (EntityState::Removed, _) => Err(removed(model)),
        (EntityState::Persisted, Some(id)) => Ok(id),
        _ => Err(DataError::NotFound(format!(
            "{} entity has never been saved",
            model.name()
        ))),
    }
}

fn removed(model: &ModelDescriptor) -> DataError {
    DataError::BadRequest(format!("{} entity has already been removed", model.name()))
}

/// Enum and validator rules over every defined, non-null value.
fn check_constraints(model: &ModelDescriptor, entity: &Entity) -> Result<(), DataError> {
    for property in model.properties() {
        let Some(value) = entity.get(property.name()).filter(|v| !v.is_null()) else {
            continue;
        };
        let config = property.config();
        if let Some(allowed) = &config.enum_values {
            if !allowed.contains(value) {
                return Err(DataError::BadRequest(format!(
                    "field '{}' must be one of {}",
                    property.name(),
                    serde_json::Value::Array(allowed.clone())
                )));
            }
        }
        if let Some(validator) = &config.validator {
            if !validator.check(value) {
                return Err(DataError::BadRequest(format!(
                    "field '{}' failed validation",
                    property.name()
                )));
            }
        }
    }
    Ok(())
}
