//! Application workflow error types.
//!
//! These errors surface as user-visible rejections during the staff
//! application flow. Each variant carries enough context to render an
//! ephemeral message naming the unmet condition.

use derive_getters::Getters;

/// Workflow error variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WorkflowErrorKind {
    /// Referenced position name is not configured.
    #[display("Unknown position: {_0}")]
    UnknownPosition(String),

    /// Position has reached its capacity limit.
    #[display("Position '{_0}' is full")]
    PositionFull(String),

    /// User already has a pending submitted application in this guild.
    #[display("A pending application already exists for this user")]
    DuplicatePending,

    /// User already has an in-progress application session in this guild.
    #[display("An application is already in progress for this user")]
    SessionInProgress,

    /// User already holds one of the configured position roles.
    #[display("User already holds the '{_0}' position role")]
    AlreadyStaff(String),

    /// No session exists for the (user, guild) pair.
    #[display("No application session found; start over with /apply")]
    SessionExpired,

    /// Question index outside the fixed form length.
    #[display("Question index {_0} out of range")]
    QuestionOutOfRange(usize),

    /// Submission attempted with one or more unanswered questions.
    #[display("Question {} has no answer", index + 1)]
    UnansweredQuestion {
        /// Zero-based index of the first empty answer slot.
        index: usize,
    },
}

/// Workflow error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Workflow Error: {} at line {} in {}", kind, line, file)]
pub struct WorkflowError {
    kind: WorkflowErrorKind,
    line: u32,
    file: &'static str,
}

impl WorkflowError {
    /// Create a new WorkflowError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use vigil_error::{WorkflowError, WorkflowErrorKind};
    ///
    /// let err = WorkflowError::new(WorkflowErrorKind::SessionExpired);
    /// ```
    #[track_caller]
    pub fn new(kind: WorkflowErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Message suitable for an ephemeral user-facing reply.
    ///
    /// Strips the source-location framing; users see only the condition.
    pub fn user_message(&self) -> String {
        self.kind.to_string()
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
