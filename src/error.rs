//! Errors produced by the activity engine.

/// The result type used by the activity engine.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors the engine reports to its caller. Everything else the engine does is total.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A configuration value can't produce a well formed calendar.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
