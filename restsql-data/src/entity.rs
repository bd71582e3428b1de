use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::model::IDENTITY_FIELD;

/// Lifecycle of an entity relative to backend storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Created but never saved; has no identity.
    Transient,
    /// Saved at least once; identity is assigned and immutable.
    Persisted,
    /// Deleted from the backend. Terminal.
    Removed,
}

/// An instance of a model: declared field values plus the reserved identity.
///
/// A field whose key is absent is *undefined* and never written by an update;
/// a field set to `Value::Null` is *explicitly null* and is written.
///
/// # Example
///
/// ```ignore
/// let mut todo = connector.create(&model, &ctx).await?;
/// todo.set("title", "write docs");
/// connector.save(&model, &mut todo).await?;
/// assert!(todo.id().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: Option<i64>,
    state: EntityState,
    values: Map<String, Value>,
}

impl Entity {
    /// A new transient entity with no field defined.
    pub fn transient() -> Self {
        Self {
            id: None,
            state: EntityState::Transient,
            values: Map::new(),
        }
    }

    /// An entity the caller already resolved against storage.
    pub fn with_identity(id: i64, values: Map<String, Value>) -> Self {
        Self {
            id: Some(id),
            state: EntityState::Persisted,
            values,
        }
    }

    /// Build a persisted entity from a stored record, lifting out the identity column.
    ///
    /// Returns `None` when the record has no integer identity.
    pub(crate) fn from_record(mut record: Map<String, Value>) -> Option<Self> {
        let id = record.remove(IDENTITY_FIELD)?.as_i64()?;
        Some(Self::with_identity(id, record))
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn is_transient(&self) -> bool {
        self.state == EntityState::Transient
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Define a field. Setting `Value::Null` stores an explicit null.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Make a field undefined again, so updates leave its column untouched.
    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.values.remove(field)
    }

    pub fn is_defined(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub(crate) fn assign_identity(&mut self, id: i64) {
        self.id = Some(id);
        self.state = EntityState::Persisted;
    }

    pub(crate) fn mark_removed(&mut self) {
        self.state = EntityState::Removed;
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(IDENTITY_FIELD, &self.id)?;
        for (key, value) in &self.values {
            if key != IDENTITY_FIELD {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
