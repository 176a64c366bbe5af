//! Error types for cypher-fluent

use thiserror::Error;

/// Result type alias for cypher-fluent operations
pub type CypherResult<T> = Result<T, CypherError>;

/// Coarse classification of a [`CypherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server rejected the query (unknown identifier, syntax error, ...).
    Authoring,
    /// The request never produced a usable response.
    Transport,
    /// The response did not match the declared result shape.
    Deserialization,
}

/// Error types for query execution
#[derive(Debug, Error)]
pub enum CypherError {
    /// The server answered with a non-success status
    #[error("Query rejected (HTTP {status}): {message}")]
    Query {
        status: u16,
        message: String,
        exception: Option<String>,
    },

    /// Transport failure reported by the underlying client
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service root could not be bootstrapped
    #[error("Connection error: {0}")]
    Connection(String),

    /// Row decode/mapping error
    #[error("Decode error in row {row}, column '{column}': {message}")]
    Decode {
        row: usize,
        column: String,
        message: String,
    },

    /// Column count does not match the declared result shape
    #[error("Result shape mismatch: expected {expected} columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Request or response body (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CypherError {
    /// Create a decode error for a specific row and column
    pub fn decode(row: usize, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            row,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a connection (bootstrap) error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Query { .. } => ErrorKind::Authoring,
            Self::Transport(_) | Self::Connection(_) => ErrorKind::Transport,
            Self::Decode { .. } | Self::ShapeMismatch { .. } | Self::Serialization(_) => {
                ErrorKind::Deserialization
            }
        }
    }

    /// Check if the server rejected the query
    pub fn is_authoring(&self) -> bool {
        self.kind() == ErrorKind::Authoring
    }

    /// Check if this is a transport or bootstrap failure
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Check if the response could not be mapped to the declared shape
    pub fn is_deserialization(&self) -> bool {
        self.kind() == ErrorKind::Deserialization
    }

    /// Build a [`CypherError::Query`] from a non-success response.
    ///
    /// The server usually answers with `{"message": ..., "exception": ...}`; when the body is
    /// not in that shape the raw body becomes the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ServerError {
            message: Option<String>,
            exception: Option<String>,
        }

        match serde_json::from_str::<ServerError>(body) {
            Ok(err) => Self::Query {
                status,
                message: err.message.unwrap_or_else(|| body.to_string()),
                exception: err.exception,
            },
            Err(_) => Self::Query {
                status,
                message: body.to_string(),
                exception: None,
            },
        }
    }
}

impl From<serde_json::Error> for CypherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
