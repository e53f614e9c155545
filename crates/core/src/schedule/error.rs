//! Schedule engine error types.

use std::fmt;

use thiserror::Error;

/// Loan term a validation failure refers to.
///
/// Displays as the wire name of the corresponding plan field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermField {
    /// Principal amount (`monto`).
    Principal,
    /// Number of installments (`cuotas`).
    InstallmentCount,
    /// Monthly interest rate (`tasaMensual`).
    MonthlyRate,
    /// Due date of the first installment (`primeraCuotaFecha`).
    FirstInstallmentDate,
    /// Disbursement date (`fechaDesembolso`).
    DisbursementDate,
    /// Administrative fee rate (`gastoAdmin`).
    AdminFee,
}

impl TermField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Principal => "monto",
            Self::InstallmentCount => "cuotas",
            Self::MonthlyRate => "tasaMensual",
            Self::FirstInstallmentDate => "primeraCuotaFecha",
            Self::DisbursementDate => "fechaDesembolso",
            Self::AdminFee => "gastoAdmin",
        }
    }
}

impl fmt::Display for TermField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schedule-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A loan term failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidTerms {
        /// Offending field.
        field: TermField,
        /// Human readable reason.
        reason: String,
    },
}

impl ScheduleError {
    /// Create an invalid terms error.
    #[must_use]
    pub fn invalid(field: TermField, reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            field,
            reason: reason.into(),
        }
    }

    /// Field that failed validation.
    #[must_use]
    pub const fn field(&self) -> TermField {
        match self {
            Self::InvalidTerms { field, .. } => *field,
        }
    }
}
