//! Schedule data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Loan terms the engine needs to build a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTerms {
    /// Principal; rounded to a whole monetary unit before use.
    pub principal: Decimal,
    /// Number of monthly installments.
    pub installment_count: i64,
    /// Monthly rate as a fraction (0.08 = 8%).
    pub monthly_rate: Decimal,
    /// Due date of installment 1.
    pub first_installment_date: NaiveDate,
}

/// A single installment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// 1-based installment index.
    pub cuota: u32,
    /// Due date for display (`dd-mm-yy`).
    pub fecha: String,
    /// Due date in canonical form.
    #[serde(rename = "fechaISO")]
    pub fecha_iso: NaiveDate,
    /// Outstanding principal before this installment.
    pub saldo: i64,
    /// Principal portion.
    pub capital: i64,
    /// Interest portion.
    pub interes: i64,
    /// `capital + interes`.
    pub total: i64,
}

/// Full amortization schedule with column totals.
///
/// Totals are always the arithmetic sum of the rows actually produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Installments in chronological order.
    pub rows: Vec<ScheduleRow>,
    /// Sum of `capital`.
    pub sum_capital: i64,
    /// Sum of `interes`.
    pub sum_interes: i64,
    /// Sum of `total`.
    pub sum_total: i64,
}

impl Schedule {
    /// Number of installments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the schedule has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last installment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }
}
