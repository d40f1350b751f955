//! Top-level error wrapper types.

use crate::{ConfigError, ServerError, WorkflowError};

/// This is the foundation error enum for the Vigil workspace. Each crate's
/// error type converts into a variant here.
///
/// # Examples
///
/// ```
/// use vigil_error::{ConfigError, VigilError};
///
/// let cfg_err = ConfigError::new("missing trigger");
/// let err: VigilError = cfg_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VigilErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Application workflow error
    #[from(WorkflowError)]
    Workflow(WorkflowError),
    /// Healthcheck server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Vigil error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vigil_error::{ConfigError, VigilResult};
///
/// fn might_fail() -> VigilResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vigil Error: {}", _0)]
pub struct VigilError(Box<VigilErrorKind>);

impl VigilError {
    /// Create a new error from a kind.
    pub fn new(kind: VigilErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VigilErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to VigilErrorKind
impl<T> From<T> for VigilError
where
    T: Into<VigilErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vigil operations.
///
/// # Examples
///
/// ```
/// use vigil_error::{ConfigError, VigilResult};
///
/// fn load() -> VigilResult<String> {
///     Err(ConfigError::new("unreadable file"))?
/// }
/// ```
pub type VigilResult<T> = std::result::Result<T, VigilError>;
