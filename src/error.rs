//! Error taxonomy for SPC analysis.
//!
//! Two failure classes are distinguished: the input itself is unusable
//! ([`SpcError::InvalidInput`]), or the input is valid but carries no
//! variation from which a capability index can be derived
//! ([`SpcError::NotComputable`]). Both are local and recoverable; an
//! unsupported subgroup size is never an error (see
//! [`control_constants`](crate::spc::control_constants)).

/// Errors produced by the SPC core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpcError {
    /// The subgroup matrix or a parameter is malformed.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// The input is valid but degenerate (e.g. zero variation).
    #[error("not computable: {reason}")]
    NotComputable {
        /// Why no result could be derived.
        reason: String,
    },
}

impl SpcError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_computable(reason: impl Into<String>) -> Self {
        Self::NotComputable {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpcError>;
