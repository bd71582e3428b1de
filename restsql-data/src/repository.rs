use crate::context::RequestContext;
use crate::entity::Entity;
use crate::error::DataError;
use crate::model::ModelDescriptor;
use std::future::Future;

/// The CRUD capability the dispatcher drives, for any model.
///
/// Uses RPITIT (return-position `impl Trait` in traits), so no `async-trait` is needed.
pub trait Connector: Send + Sync {
    fn find(
        &self,
        model: &ModelDescriptor,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<Entity>, DataError>> + Send;

    fn find_one(
        &self,
        model: &ModelDescriptor,
        ctx: &RequestContext,
        apply_filter: bool,
    ) -> impl Future<Output = Result<Entity, DataError>> + Send;

    fn create(
        &self,
        model: &ModelDescriptor,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Entity, DataError>> + Send;

    /// Insert a transient entity or update a persisted one, in place.
    ///
    /// On failure the entity is left exactly as it was passed in.
    fn save(
        &self,
        model: &ModelDescriptor,
        entity: &mut Entity,
    ) -> impl Future<Output = Result<(), DataError>> + Send;

    fn delete_one(
        &self,
        model: &ModelDescriptor,
        entity: &mut Entity,
    ) -> impl Future<Output = Result<(), DataError>> + Send;

    fn delete(
        &self,
        model: &ModelDescriptor,
        entities: &mut [Entity],
    ) -> impl Future<Output = Result<(), DataError>> + Send;
}
