//! Error types for qeutil

use thiserror::Error;

/// Result type alias for qeutil operations
pub type QeResult<T> = Result<T, QeError>;

/// Error types for clause rendering, execution and caching
#[derive(Debug, Error)]
pub enum QeError {
    /// Operator token outside the supported set
    #[error("Invalid operator: {0:?}")]
    InvalidOperator(String),

    /// Operand shape does not fit the operator (e.g. `in` with a scalar)
    #[error("Invalid operand for `{operator}` on column '{column}': {message}")]
    InvalidOperand {
        operator: String,
        column: String,
        message: String,
    },

    /// The clause could not be turned into SQL
    #[error("Render error: {0}")]
    Render(String),

    /// A cache key was requested for a clause without a target table
    #[error("Target table not given")]
    EmptyTable,

    /// Identifier or input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Required resources do not exist in the database
    #[error("Required resources not exist in DB: {0}")]
    NotExist(String),

    /// The statement was accepted but no row was affected
    #[error("No row affected")]
    NotChanged,

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Cache codec error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cache store error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl QeError {
    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a cache store error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Check if this is an invalid operator error
    pub fn is_invalid_operator(&self) -> bool {
        matches!(self, Self::InvalidOperator(_))
    }

    /// Check if this is a render error
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    /// Check if this is a not-changed error
    pub fn is_not_changed(&self) -> bool {
        matches!(self, Self::NotChanged)
    }

    /// Check if this is a not-exist error
    pub fn is_not_exist(&self) -> bool {
        matches!(self, Self::NotExist(_))
    }

    /// Parse a tokio_postgres error into a more specific QeError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

impl From<serde_json::Error> for QeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QeError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for QeError {
    fn from(err: redis::RedisError) -> Self {
        Self::Cache(err.to_string())
    }
}
