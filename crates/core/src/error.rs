//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// illegal transitions, stock shortfalls). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The requested action is not legal from the document's current status.
    #[error("invalid transition: action '{action}' not allowed from status '{status}'")]
    InvalidTransition { status: String, action: String },

    /// A value failed validation (e.g. missing rejection reason,
    /// non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An outbound movement would drive stock negative and backorder was
    /// not allowed.
    #[error(
        "insufficient stock for product {product_id} in warehouse {warehouse_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: String,
        warehouse_id: String,
        available: i64,
        requested: i64,
    },

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A work order was selected by a settlement after having been marked.
    #[error("work order {0} is already settled")]
    AlreadySettled(String),

    /// Settlement create found no eligible work orders in the period.
    #[error("nothing to settle for the requested period")]
    NothingToSettle,

    /// A conflict occurred (e.g. tenant mismatch, duplicate identifier).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_transition(status: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidTransition {
            status: status.into(),
            action: action.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
