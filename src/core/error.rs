use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("Property '{0}' not found")]
    PropertyNotFound(String),

    #[error("Unknown wire type '{0}'")]
    UnknownWireType(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, TableError>;

impl<T> From<std::sync::PoisonError<T>> for TableError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned(err.to_string())
    }
}
