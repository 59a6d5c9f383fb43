//! Error taxonomy for the chain model

use thiserror::Error;
use uuid::Uuid;

/// Raised when a Signal, Link or Chain is built from invalid fields.
/// The invalid value is never created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("confidence must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),

    #[error("cost estimate must not be negative, got {0}")]
    NegativeCost(f64),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("confidence must carry at most two decimals, got {0}")]
    ConfidenceNotRounded(f64),

    #[error("signal type must be at least {min} characters, got {got:?}")]
    SignalTypeTooShort { min: usize, got: String },

    #[error("chain name must be at least {min} characters, got {got:?}")]
    ChainNameTooShort { min: usize, got: String },

    #[error("link weight must be within [0, 1], got {0}")]
    WeightOutOfRange(f64),
}

/// Raised when a Link references a Signal the chain does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("link source {0} does not exist in this chain")]
    MissingSource(Uuid),

    #[error("link target {0} does not exist in this chain")]
    MissingTarget(Uuid),
}

/// Any invariant violation found on a fully-formed chain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("signal stored under {key} carries id {actual}")]
    KeyMismatch { key: Uuid, actual: Uuid },

    #[error("updated_at precedes created_at")]
    TimestampsOutOfOrder,
}
