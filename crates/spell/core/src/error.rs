//! Common error infrastructure for spell-core.
//!
//! Two kinds of failure exist in this crate:
//!
//! - **Domain failures** (cooldown active, prerequisite unmet, no charges, ...)
//!   are [`CastResult`](crate::spell::CastResult) codes. They are ordinary
//!   outcomes, surfaced to the caster through a notification or swallowed for
//!   proxy casts.
//! - **Contract and integrity failures** are [`SpellError`]. Calling `cast()`
//!   from the wrong status, or a threshold chain pointing at data that does not
//!   exist, ends up here.

use crate::spell::SpellStatus;
use crate::state::{EntityId, SpellId};

/// Severity level of an error. Picks the log level and fields when a failure
/// is reported.
///
/// - **Recoverable**: Temporary conditions that may succeed on retry
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Broken data or contract; the affected cast cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative input.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - the cast instance must be aborted.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all spell-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// Cast Errors
// ============================================================================

/// Driving operation named in [`SpellError::InvalidState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CastOperation {
    Cast,
    ThresholdCast,
}

/// Contract violations and data-integrity failures raised by a cast.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellError {
    /// A driving operation was called from a status that does not allow it.
    #[error("{operation} is not valid while the cast is {status}")]
    InvalidState {
        operation: CastOperation,
        status: SpellStatus,
    },

    /// The chain needed threshold entry `index` of `spell` but it does not exist.
    #[error("spell {spell} has no threshold entry at index {index}")]
    MissingThreshold { spell: SpellId, index: usize },

    /// A spell referenced by data is missing from the catalog.
    #[error("spell {0} is not in the catalog")]
    UnknownSpell(SpellId),
}

impl CoreError for SpellError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidState { .. } => ErrorSeverity::Internal,
            Self::MissingThreshold { .. } | Self::UnknownSpell(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState { .. } => "SPELL_INVALID_STATE",
            Self::MissingThreshold { .. } => "SPELL_MISSING_THRESHOLD",
            Self::UnknownSpell(_) => "SPELL_UNKNOWN_SPELL",
        }
    }
}

// ============================================================================
// Effect Errors
// ============================================================================

/// Errors reported by effect handlers.
///
/// A failed handler is logged and the application does not count towards the
/// effect's trigger counter; the rest of the pass continues.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectError {
    /// The target could not be resolved when the handler ran.
    #[error("effect target {0} not found")]
    TargetNotFound(EntityId),

    /// The effect data is malformed for this handler.
    #[error("invalid effect data: {0}")]
    InvalidData(String),

    /// Handler-specific failure.
    #[error("effect failed: {0}")]
    Failed(String),
}

impl CoreError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TargetNotFound(_) => ErrorSeverity::Recoverable,
            Self::InvalidData(_) => ErrorSeverity::Validation,
            Self::Failed(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TargetNotFound(_) => "EFFECT_TARGET_NOT_FOUND",
            Self::InvalidData(_) => "EFFECT_INVALID_DATA",
            Self::Failed(_) => "EFFECT_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_message_names_operation_and_status() {
        let err = SpellError::InvalidState {
            operation: CastOperation::Cast,
            status: SpellStatus::Casting,
        };
        assert_eq!(err.to_string(), "cast is not valid while the cast is Casting");
        assert_eq!(err.severity(), ErrorSeverity::Internal);
    }

    #[test]
    fn missing_threshold_is_fatal() {
        let err = SpellError::MissingThreshold {
            spell: SpellId(7),
            index: 3,
        };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.error_code(), "SPELL_MISSING_THRESHOLD");
    }

    #[test]
    fn missing_effect_target_is_recoverable() {
        let err = EffectError::TargetNotFound(EntityId(4));
        assert!(err.severity().is_recoverable());
        assert_eq!(err.severity().as_str(), "recoverable");
        assert!(!EffectError::Failed("x".into()).severity().is_recoverable());
    }
}
