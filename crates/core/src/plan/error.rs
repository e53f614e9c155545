//! Plan store error types.

use planpago_shared::AppError;
use planpago_shared::types::PlanId;
use thiserror::Error;

use super::fields::PlanField;
use super::storage::StorageError;
use crate::schedule::ScheduleError;

/// Plan store errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A required field is absent or blank.
    #[error("Missing required field: {0}")]
    MissingRequiredField(PlanField),

    /// `monto` is not a finite number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A loan term is out of range.
    #[error(transparent)]
    InvalidTerms(#[from] ScheduleError),

    /// No plan with this id.
    #[error("Plan not found: {0}")]
    NotFound(PlanId),

    /// The snapshot could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::NotFound(id) => Self::NotFound(format!("Plan {id}")),
            PlanError::Storage(e) => Self::Storage(e.to_string()),
            e @ (PlanError::MissingRequiredField(_)
            | PlanError::InvalidAmount(_)
            | PlanError::InvalidTerms(_)) => Self::Validation(e.to_string()),
        }
    }
}
