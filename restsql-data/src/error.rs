use http::StatusCode;

/// Domain error kinds surfaced to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Internal,
}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    /// No row matched a single-row operation, or an identifier failed to parse.
    NotFound(String),
    /// A constraint or validation rule rejected the entity.
    BadRequest(String),
    /// An unclassified backend failure (connectivity, syntax, protocol...).
    Database(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `restsql-mysql`) to wrap driver errors
    /// that carry no more specific classification.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::NotFound(_) => ErrorKind::NotFound,
            DataError::BadRequest(_) => ErrorKind::BadRequest,
            DataError::Database(_) | DataError::Other(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status the dispatcher should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Classification of a failure coming out of a backend call.
///
/// Every connector operation funnels backend errors through this exactly once.
/// Errors that already carry a domain kind map to themselves.
pub trait IntoDataError {
    fn into_data_error(self) -> DataError;
}

impl IntoDataError for DataError {
    fn into_data_error(self) -> DataError {
        self
    }
}

/// Errors raised while building a model descriptor.
///
/// These halt initialization; connector operations never produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    MissingConfig { model: String, property: String },
    InvalidIdentifier { kind: &'static str, ident: String },
    ReservedProperty { model: String, property: String },
    DuplicateProperty { model: String, property: String },
    InvalidEnum { model: String, property: String },
    UnknownModel(String),
}

impl std::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionError::MissingConfig { model, property } => write!(
                f,
                "In {model}: property '{property}' is missing a configuration"
            ),
            DefinitionError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            DefinitionError::ReservedProperty { model, property } => write!(
                f,
                "In {model}: property '{property}' collides with the reserved identity field"
            ),
            DefinitionError::DuplicateProperty { model, property } => {
                write!(f, "In {model}: property '{property}' is declared twice")
            }
            DefinitionError::InvalidEnum { model, property } => write!(
                f,
                "In {model}: option 'enum' on '{property}' must list at least one value"
            ),
            DefinitionError::UnknownModel(name) => {
                write!(f, "Model '{name}' is not registered")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}
