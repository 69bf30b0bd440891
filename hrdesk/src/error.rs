//! Error types shared by every hrdesk operation.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures an operation can report back to its caller.
///
/// Every variant is recoverable at the handler boundary: the caller shows the message
/// and reconciles by reloading the table from storage.
#[derive(Debug, Error)]
pub enum Error {
    /// No connection could be established, or the connection settings are incomplete.
    #[error("connection error: {0}")]
    Connection(String),

    /// The table structure needed by the operation could not be resolved
    /// (missing primary key, no columns, unknown column).
    #[error("{0}")]
    SchemaResolution(String),

    /// Malformed user input, rejected before any statement was sent.
    #[error("{0}")]
    Validation(String),

    /// The database rejected a statement.
    #[error("statement failed: {0}")]
    Statement(#[from] sqlx::Error),

    /// The row being updated vanished between load and update.
    #[error("no row with {column} = {key} exists anymore; submit the row again as a new row to insert it")]
    StaleRow { column: String, key: i64 },

    /// A multi-step workflow stopped after some of its steps were already persisted.
    #[error("workflow stopped after partial completion: {0}")]
    PartialWorkflow(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no table selected; please select a table first")]
    NoTableSelected,

    /// A destructive operation was declined at the confirmation step.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaResolution(msg.into())
    }

    pub fn partial(msg: impl Into<String>) -> Self {
        Self::PartialWorkflow(msg.into())
    }

    /// Short category name, used as the title of user-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            Error::Connection(_) => "Connection Error",
            Error::SchemaResolution(_) => "Schema Error",
            Error::Validation(_) => "Invalid Input",
            Error::Statement(_) => "Statement Error",
            Error::StaleRow { .. } => "Warning",
            Error::PartialWorkflow(_) => "Incomplete Operation",
            Error::Io(_) | Error::Csv(_) => "File Error",
            Error::NoTableSelected => "Error",
            Error::Cancelled => "Cancelled",
        }
    }
}
