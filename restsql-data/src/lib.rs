//! # restsql-data: relational connector core
//!
//! Maps a declarative model (a named entity type with ordered, typed and
//! configured properties) and a request context onto SQL statements, and
//! exposes the six CRUD operations a REST dispatcher needs.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ModelDescriptor`] | Validated table + property list, built once from a [`ModelRegistry`] |
//! | [`Entity`] | Field values plus the reserved `id`, with a Transient/Persisted/Removed lifecycle |
//! | [`RequestContext`] / [`Filter`] | Route parameters and an optional typed predicate |
//! | [`QueryBuilder`] | WHERE / SET synthesis with bound parameters |
//! | [`marshal`] | `flatten` / `unflatten` between field values and storage |
//! | [`Connector`] / [`SqlConnector`] | The CRUD capability over any [`Backend`] |
//! | [`DataError`] | NotFound / BadRequest / Internal taxonomy |
//!
//! Driver crates (e.g. `restsql-mysql`) implement [`Backend`]. Whatever error
//! type they report only needs [`IntoDataError`].

pub mod backend;
pub mod context;
pub mod crud;
pub mod entity;
pub mod error;
pub mod marshal;
pub mod model;
pub mod query;
pub mod repository;

pub use backend::{Backend, ExecOutcome, Record};
pub use context::{Filter, RequestContext};
pub use crud::SqlConnector;
pub use entity::{Entity, EntityState};
pub use error::{DataError, DefinitionError, ErrorKind, IntoDataError};
pub use marshal::SqlValue;
pub use model::{
    FieldKind, ModelDescriptor, ModelRegistry, PrimitiveType, Property, PropertyConfig,
    PropertyDescriptor, StaticRegistry,
};
pub use query::{QueryBuilder, Statement};
pub use repository::Connector;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        Connector, DataError, Entity, FieldKind, Filter, ModelDescriptor, PrimitiveType,
        PropertyConfig, PropertyDescriptor, RequestContext, SqlConnector,
    };
}
