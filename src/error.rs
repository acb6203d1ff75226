//! Error types for the sample-size and design engine.

use thiserror::Error;

/// Failure raised by the statistical core.
///
/// Inputs are never clamped or replaced with defaults: anything out of
/// domain is rejected and handed back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesignError {
    /// A required numeric input is absent, non-finite or outside its domain.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A computation was invoked before the result it depends on existed.
    #[error("missing dependency: {0} must be computed first")]
    MissingDependency(&'static str),
}

impl DesignError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// True for [`DesignError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

pub type DesignResult<T> = Result<T, DesignError>;
