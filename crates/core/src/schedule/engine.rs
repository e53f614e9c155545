//! Schedule engine: flat rate on declining balance, equal principal shares.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::{ScheduleError, TermField};
use super::types::{Schedule, ScheduleRow, ScheduleTerms};

/// Upper bound on installments (100 years of monthly payments).
pub const MAX_INSTALLMENTS: i64 = 1200;

/// Canonical wire format for calendar dates.
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format used in schedule rows.
const DISPLAY_DATE_FORMAT: &str = "%d-%m-%y";

/// Engine for building amortization schedules.
pub struct ScheduleEngine;

impl ScheduleEngine {
    /// Builds the schedule for the given terms.
    ///
    /// - Principal is rounded to a whole unit and split into equal floor shares;
    ///   the remainder goes entirely to the last installment.
    /// - Interest for installment *i* is `round(balance_before_i * rate)`.
    /// - Installment *i* falls `i - 1` months after the first date, clamped to
    ///   the end of shorter months.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidTerms` naming the offending field when a
    /// term is out of range or an amount overflows.
    pub fn generate(terms: &ScheduleTerms) -> Result<Schedule, ScheduleError> {
        let principal = round_half_up(terms.principal).ok_or_else(|| {
            ScheduleError::invalid(TermField::Principal, "amount is out of range")
        })?;

        if terms.installment_count <= 0 {
            return Err(ScheduleError::invalid(
                TermField::InstallmentCount,
                "must be a positive integer",
            ));
        }
        if terms.installment_count > MAX_INSTALLMENTS {
            return Err(ScheduleError::invalid(
                TermField::InstallmentCount,
                format!("must not exceed {MAX_INSTALLMENTS}"),
            ));
        }
        if terms.monthly_rate < Decimal::ZERO {
            return Err(ScheduleError::invalid(
                TermField::MonthlyRate,
                "must be zero or positive",
            ));
        }

        let count = terms.installment_count;
        let capital_base = principal.div_euclid(count);
        let capital_remainder = principal - capital_base * count;

        let mut rows = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
        let mut saldo = principal;

        for index in 1..=count {
            let cuota = u32::try_from(index).map_err(|_| {
                ScheduleError::invalid(TermField::InstallmentCount, "is out of range")
            })?;
            let fecha_iso = Self::installment_date(terms.first_installment_date, cuota - 1)
                .ok_or_else(|| {
                    ScheduleError::invalid(
                        TermField::FirstInstallmentDate,
                        "installment dates fall outside the supported calendar",
                    )
                })?;

            let capital = if index == count {
                capital_base + capital_remainder
            } else {
                capital_base
            };

            // interest on the balance before this installment's capital
            let interes = Decimal::from(saldo)
                .checked_mul(terms.monthly_rate)
                .and_then(round_half_up)
                .ok_or_else(|| {
                    ScheduleError::invalid(TermField::MonthlyRate, "interest overflows")
                })?;

            let total = capital.checked_add(interes).ok_or_else(|| {
                ScheduleError::invalid(TermField::MonthlyRate, "installment total overflows")
            })?;

            rows.push(ScheduleRow {
                cuota,
                fecha: format_display_date(fecha_iso),
                fecha_iso,
                saldo,
                capital,
                interes,
                total,
            });

            saldo -= capital;
        }

        Self::with_totals(rows)
    }

    /// Date of the installment `offset` months after `first`.
    ///
    /// Day-of-month is preserved, or clamped to the last day of the target
    /// month when it does not exist there (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn installment_date(first: NaiveDate, offset: u32) -> Option<NaiveDate> {
        first.checked_add_months(Months::new(offset))
    }

    fn with_totals(rows: Vec<ScheduleRow>) -> Result<Schedule, ScheduleError> {
        let overflow = || ScheduleError::invalid(TermField::MonthlyRate, "schedule totals overflow");

        let sum_capital = checked_sum(rows.iter().map(|r| r.capital)).ok_or_else(overflow)?;
        let sum_interes = checked_sum(rows.iter().map(|r| r.interes)).ok_or_else(overflow)?;
        let sum_total = checked_sum(rows.iter().map(|r| r.total)).ok_or_else(overflow)?;

        Ok(Schedule {
            rows,
            sum_capital,
            sum_interes,
            sum_total,
        })
    }
}

fn checked_sum(mut values: impl Iterator<Item = i64>) -> Option<i64> {
    values.try_fold(0i64, i64::checked_add)
}

/// Rounds to the nearest whole unit, halves upward (`floor(x + 0.5)`).
///
/// Returns `None` when the result does not fit an `i64`.
#[must_use]
pub fn round_half_up(value: Decimal) -> Option<i64> {
    value
        .checked_add(Decimal::new(5, 1))
        .map(|shifted| shifted.floor())
        .and_then(|rounded| rounded.to_i64())
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidTerms` for `field` when the text is not a
/// valid calendar date.
pub fn parse_calendar_date(field: TermField, raw: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT).map_err(|_| {
        ScheduleError::invalid(field, format!("'{raw}' is not a valid date (use YYYY-MM-DD)"))
    })
}

/// Formats a date as `dd-mm-yy`.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}
