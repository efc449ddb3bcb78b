//! Error types for the manageability binding.

use thiserror::Error;

/// Errors that can occur while marshaling values or invoking API commands.
#[derive(Debug, Error)]
pub enum NamError {
    /// A value or hash key could not be converted into an element tree.
    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    /// The server answered with a non-ok result status.
    #[error("API.server_invoke: Error {errno}: {reason}")]
    RemoteOperation {
        /// The API command that failed.
        command: String,
        /// Remote error number.
        errno: i32,
        /// Human readable reason reported by the server.
        reason: String,
    },

    /// Failure reported by the underlying transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Binding-level failure (startup, open, use of a closed handle).
    #[error("{0}")]
    Api(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl NamError {
    /// Remote error number, if this is a [`NamError::RemoteOperation`].
    pub fn errno(&self) -> Option<i32> {
        match self {
            NamError::RemoteOperation { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    pub fn is_type_conversion(&self) -> bool {
        matches!(self, NamError::TypeConversion(_))
    }
}

pub type Result<T> = std::result::Result<T, NamError>;
