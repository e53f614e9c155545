//! Plan record and caller input types.

use std::str::FromStr;

use chrono::NaiveDate;
use planpago_shared::types::PlanId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PlanError;
use super::fields::PlanField;
use crate::schedule::{Schedule, ScheduleTerms};

/// A stored payment plan.
///
/// `schedule` always matches the stored financial terms at the time of the
/// last create or recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Identifier assigned at creation.
    pub id: PlanId,
    /// Free-form plan number label.
    #[serde(default)]
    pub plan_numero: Option<String>,
    /// Free-form management period label.
    #[serde(default)]
    pub gestion: Option<String>,
    /// Borrower name.
    pub nombre: String,
    /// Borrower identity document.
    pub dni: String,
    /// Disbursement date.
    pub fecha_desembolso: NaiveDate,
    /// Principal in whole monetary units.
    pub monto: i64,
    /// Monthly interest rate as a fraction.
    #[serde(with = "rust_decimal::serde::float")]
    pub tasa_mensual: Decimal,
    /// Administrative fee rate; stored and displayed, never charged.
    #[serde(with = "rust_decimal::serde::float")]
    pub gasto_admin: Decimal,
    /// Number of monthly installments.
    pub cuotas: u32,
    /// Payment method label.
    pub forma_pago: String,
    /// Due date of installment 1. Older records may lack it.
    #[serde(default)]
    pub primera_cuota_fecha: Option<NaiveDate>,
    /// Derived amortization schedule.
    pub schedule: Schedule,
}

impl Plan {
    /// Schedule terms derived from the stored record.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::MissingRequiredField` when the record has no first
    /// installment date.
    pub fn schedule_terms(&self) -> Result<ScheduleTerms, PlanError> {
        let first_installment_date = self
            .primera_cuota_fecha
            .ok_or(PlanError::MissingRequiredField(PlanField::PrimeraCuotaFecha))?;

        Ok(ScheduleTerms {
            principal: Decimal::from(self.monto),
            installment_count: i64::from(self.cuotas),
            monthly_rate: self.tasa_mensual,
            first_installment_date,
        })
    }

    /// Case-insensitive substring match over the borrower and label fields.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        [
            Some(self.nombre.as_str()),
            Some(self.dni.as_str()),
            self.plan_numero.as_deref(),
            self.gestion.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(needle))
    }
}

/// A numeric value as supplied by a caller.
///
/// Clients send numbers either as JSON numbers or as strings; anything that
/// does not parse is kept so validation can name the offending field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    /// A value that parsed as a decimal.
    Number(Decimal),
    /// Anything else.
    Other(serde_json::Value),
}

impl NumberInput {
    /// The numeric value, if there is one.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Other(serde_json::Value::String(raw)) => {
                let raw = raw.trim();
                Decimal::from_str(raw)
                    .or_else(|_| Decimal::from_scientific(raw))
                    .ok()
            }
            Self::Other(_) => None,
        }
    }
}

impl From<Decimal> for NumberInput {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for NumberInput {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<&str> for NumberInput {
    fn from(value: &str) -> Self {
        Self::Other(serde_json::Value::String(value.to_owned()))
    }
}

/// Input for creating a plan.
///
/// Every field is optional at the type level; required fields are checked by
/// the service so the error can name them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    /// Plan number label.
    pub plan_numero: Option<String>,
    /// Management period label.
    pub gestion: Option<String>,
    /// Borrower name.
    pub nombre: Option<String>,
    /// Borrower identity document.
    pub dni: Option<String>,
    /// Disbursement date, `YYYY-MM-DD`.
    pub fecha_desembolso: Option<String>,
    /// Principal.
    pub monto: Option<NumberInput>,
    /// Monthly rate.
    pub tasa_mensual: Option<NumberInput>,
    /// Administrative fee rate.
    pub gasto_admin: Option<NumberInput>,
    /// Installment count.
    pub cuotas: Option<NumberInput>,
    /// Payment method label.
    pub forma_pago: Option<String>,
    /// First installment date, `YYYY-MM-DD`.
    pub primera_cuota_fecha: Option<String>,
}

/// Partial update of a plan.
///
/// Absent fields are left unchanged. Every field distinguishes absent from an
/// explicit `null`: `null` clears the label fields and `primeraCuotaFecha`,
/// and is rejected for the required fields and the financial terms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPatch {
    /// Plan number label.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub plan_numero: Option<Option<String>>,
    /// Management period label.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub gestion: Option<Option<String>>,
    /// Borrower name.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub nombre: Option<Option<String>>,
    /// Borrower identity document.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub dni: Option<Option<String>>,
    /// Disbursement date, `YYYY-MM-DD`.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub fecha_desembolso: Option<Option<String>>,
    /// Principal.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub monto: Option<Option<NumberInput>>,
    /// Monthly rate.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub tasa_mensual: Option<Option<NumberInput>>,
    /// Administrative fee rate.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub gasto_admin: Option<Option<NumberInput>>,
    /// Installment count.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub cuotas: Option<Option<NumberInput>>,
    /// Payment method label.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub forma_pago: Option<Option<String>>,
    /// First installment date, `YYYY-MM-DD`.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub primera_cuota_fecha: Option<Option<String>>,
}

impl PlanPatch {
    /// Fields present in this patch.
    #[must_use]
    pub fn touched_fields(&self) -> Vec<PlanField> {
        [
            (PlanField::PlanNumero, self.plan_numero.is_some()),
            (PlanField::Gestion, self.gestion.is_some()),
            (PlanField::Nombre, self.nombre.is_some()),
            (PlanField::Dni, self.dni.is_some()),
            (PlanField::FechaDesembolso, self.fecha_desembolso.is_some()),
            (PlanField::Monto, self.monto.is_some()),
            (PlanField::TasaMensual, self.tasa_mensual.is_some()),
            (PlanField::GastoAdmin, self.gasto_admin.is_some()),
            (PlanField::Cuotas, self.cuotas.is_some()),
            (PlanField::FormaPago, self.forma_pago.is_some()),
            (PlanField::PrimeraCuotaFecha, self.primera_cuota_fecha.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, touched)| touched.then_some(field))
        .collect()
    }

    /// Returns true if applying this patch rebuilds the schedule.
    #[must_use]
    pub fn requires_recompute(&self) -> bool {
        self.touched_fields()
            .into_iter()
            .any(PlanField::triggers_recompute)
    }
}
