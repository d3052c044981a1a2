use thiserror::Error;

/// Operation outcome kinds surfaced by the entry-point actions.
///
/// `AuthorizationDenied` and `InvalidInput` are expected, caller-recoverable
/// outcomes. `Internal` is a fault: the cause is logged where it occurs and
/// the caller only sees an opaque failure.
#[derive(Error, Debug)]
pub enum AppError {
    /// A rule denied the operation. Deliberately carries no detail about
    /// which rule failed.
    #[error("Not permitted")]
    AuthorizationDenied,

    /// A precondition on user input failed (category bounds, description
    /// length, duplicate slug). Carries a human-readable message.
    #[error("{0}")]
    InvalidInput(String),

    /// Store connectivity, transaction failure, unexpected data shape.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
