//! Static model descriptions: field kinds, per-property configuration and the
//! registry that hands them to the connector.
//!
//! A [`ModelDescriptor`] is built once, up front, from an ordered list of
//! [`PropertyDescriptor`]s. Every check that can fail on a malformed
//! declaration happens there, so connector operations never see one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::error::DefinitionError;
use crate::query::is_valid_identifier;

/// Name of the reserved identity column every model carries.
pub const IDENTITY_FIELD: &str = "id";

/// Scalar storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Text,
    Numeric,
    Boolean,
    Temporal,
    Identifier,
}

/// Storage shape of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Primitive(PrimitiveType),
    ArrayOf(Box<FieldKind>),
    /// Structured value stored as serialized JSON text.
    Composite,
    /// Link to another model's identity.
    Reference,
}

impl FieldKind {
    pub fn array_of(inner: FieldKind) -> Self {
        FieldKind::ArrayOf(Box::new(inner))
    }

    /// Whether values of this kind are stored as JSON text.
    pub fn is_structured(&self) -> bool {
        matches!(self, FieldKind::Composite | FieldKind::ArrayOf(_))
    }
}

/// A caller-supplied predicate a value must satisfy before it is saved.
#[derive(Clone)]
pub struct Validator(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Validator {
    pub fn new(check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Validation and storage options of a single property.
#[derive(Debug, Clone, Default)]
pub struct PropertyConfig {
    pub required: bool,
    pub unique: bool,
    pub indexed: bool,
    pub default: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub validator: Option<Validator>,
    pub is_reference: bool,
}

impl PropertyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn validator(mut self, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Validator::new(check));
        self
    }

    pub fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }
}

/// A property as declared by the registry. The configuration may be missing
/// on a faulty declaration; [`ModelDescriptor::new`] rejects that.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub config: Option<PropertyConfig>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind, config: PropertyConfig) -> Self {
        Self {
            name: name.into(),
            kind,
            config: Some(config),
        }
    }

    /// A declaration without configuration.
    pub fn unconfigured(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            config: None,
        }
    }
}

/// A validated property of a [`ModelDescriptor`].
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    kind: FieldKind,
    config: PropertyConfig,
}

impl Property {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn config(&self) -> &PropertyConfig {
        &self.config
    }
}

/// Static description of an entity type: its table and ordered properties.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    name: String,
    properties: Vec<Property>,
}

impl ModelDescriptor {
    /// Build a descriptor, failing fast on any malformed declaration.
    pub fn new(
        name: impl Into<String>,
        properties: impl IntoIterator<Item = PropertyDescriptor>,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        if !is_valid_identifier(&name) {
            return Err(DefinitionError::InvalidIdentifier {
                kind: "table",
                ident: name,
            });
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for prop in properties {
            if !is_valid_identifier(&prop.name) {
                return Err(DefinitionError::InvalidIdentifier {
                    kind: "column",
                    ident: prop.name,
                });
            }
            if prop.name == IDENTITY_FIELD {
                return Err(DefinitionError::ReservedProperty {
                    model: name,
                    property: prop.name,
                });
            }
            if !seen.insert(prop.name.clone()) {
                return Err(DefinitionError::DuplicateProperty {
                    model: name,
                    property: prop.name,
                });
            }
            let Some(config) = prop.config else {
                return Err(DefinitionError::MissingConfig {
                    model: name,
                    property: prop.name,
                });
            };
            if matches!(&config.enum_values, Some(values) if values.is_empty()) {
                return Err(DefinitionError::InvalidEnum {
                    model: name,
                    property: prop.name,
                });
            }
            resolved.push(Property {
                name: prop.name,
                kind: prop.kind,
                config,
            });
        }

        Ok(Self {
            name,
            properties: resolved,
        })
    }

    /// Build the descriptor for `model` from the properties a registry lists.
    pub fn from_registry(
        registry: &dyn ModelRegistry,
        model: &str,
    ) -> Result<Self, DefinitionError> {
        let properties = registry
            .list_properties_of(model)
            .ok_or_else(|| DefinitionError::UnknownModel(model.to_string()))?;
        Self::new(model, properties)
    }

    /// Model name, which is also the backing table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Source of property declarations per model.
///
/// Implementations must be deterministic: the same model always yields the
/// same ordered list.
pub trait ModelRegistry: Send + Sync {
    fn list_properties_of(&self, model: &str) -> Option<Vec<PropertyDescriptor>>;
}

/// A registry populated explicitly at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    models: HashMap<String, Vec<PropertyDescriptor>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        model: impl Into<String>,
        properties: impl IntoIterator<Item = PropertyDescriptor>,
    ) -> Self {
        self.models
            .insert(model.into(), properties.into_iter().collect());
        self
    }
}

impl ModelRegistry for StaticRegistry {
    fn list_properties_of(&self, model: &str) -> Option<Vec<PropertyDescriptor>> {
        self.models.get(model).cloned()
    }
}
