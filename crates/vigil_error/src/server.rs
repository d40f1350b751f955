//! Healthcheck server error types.

use derive_getters::Getters;

/// Server error variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Failed to bind the listen address.
    #[display("Failed to bind {addr}: {reason}")]
    BindFailed {
        /// Address the server attempted to bind.
        addr: String,
        /// Underlying failure description.
        reason: String,
    },

    /// Server terminated with an I/O error.
    #[display("Server I/O error: {_0}")]
    Io(String),
}

/// Healthcheck server error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    kind: ServerErrorKind,
    line: u32,
    file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
