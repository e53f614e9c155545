//! Plan store operations.

use std::sync::Arc;

use chrono::NaiveDate;
use planpago_shared::config::PlanDefaultsConfig;
use planpago_shared::types::PlanId;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::PlanError;
use super::fields::PlanField;
use super::storage::PlanStorage;
use super::types::{NewPlan, NumberInput, Plan, PlanPatch};
use crate::schedule::{
    ScheduleEngine, ScheduleError, ScheduleTerms, TermField, parse_calendar_date, round_half_up,
};

/// Values applied to fields omitted on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDefaults {
    /// Monthly interest rate.
    pub tasa_mensual: Decimal,
    /// Administrative fee rate.
    pub gasto_admin: Decimal,
    /// Installment count.
    pub cuotas: u32,
    /// Payment method label.
    pub forma_pago: String,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self::from(&PlanDefaultsConfig::default())
    }
}

impl From<&PlanDefaultsConfig> for PlanDefaults {
    fn from(config: &PlanDefaultsConfig) -> Self {
        Self {
            tasa_mensual: config.tasa_mensual,
            gasto_admin: config.gasto_admin,
            cuotas: config.cuotas,
            forma_pago: config.forma_pago.clone(),
        }
    }
}

/// Service owning the plan collection.
///
/// Each operation loads the full collection, works on it and, for writes,
/// replaces the stored snapshot. Operations are not serialized against each
/// other: two concurrent writers each start from the snapshot they loaded and
/// the later `replace` wins, dropping the earlier writer's change.
pub struct PlanService {
    storage: Arc<dyn PlanStorage>,
    defaults: PlanDefaults,
}

impl PlanService {
    /// Creates a service with the built-in defaults.
    #[must_use]
    pub fn new(storage: Arc<dyn PlanStorage>) -> Self {
        Self::with_defaults(storage, PlanDefaults::default())
    }

    /// Creates a service with custom defaults.
    #[must_use]
    pub fn with_defaults(storage: Arc<dyn PlanStorage>, defaults: PlanDefaults) -> Self {
        Self { storage, defaults }
    }

    /// Defaults applied on creation.
    #[must_use]
    pub fn defaults(&self) -> &PlanDefaults {
        &self.defaults
    }

    /// Creates a plan, generates its schedule and persists it.
    ///
    /// Required fields are checked first (`nombre`, `dni`, `fechaDesembolso`,
    /// `primeraCuotaFecha`), then `monto`, then the remaining terms. Omitted
    /// `tasaMensual`, `gastoAdmin`, `cuotas` and `formaPago` take the defaults.
    ///
    /// # Errors
    ///
    /// - `PlanError::MissingRequiredField` for an absent or blank required field
    /// - `PlanError::InvalidAmount` when `monto` is absent or not numeric
    /// - `PlanError::InvalidTerms` when a term or date is out of range
    /// - `PlanError::Storage` when the snapshot cannot be read or written
    pub async fn create_plan(&self, input: NewPlan) -> Result<Plan, PlanError> {
        let nombre = required_text(input.nombre, PlanField::Nombre)?;
        let dni = required_text(input.dni, PlanField::Dni)?;
        let fecha_desembolso = required_text(input.fecha_desembolso, PlanField::FechaDesembolso)?;
        let primera_cuota_fecha =
            required_text(input.primera_cuota_fecha, PlanField::PrimeraCuotaFecha)?;

        let monto = parse_amount(input.monto.as_ref())?;

        let fecha_desembolso = parse_calendar_date(TermField::DisbursementDate, &fecha_desembolso)?;
        let primera_cuota_fecha =
            parse_calendar_date(TermField::FirstInstallmentDate, &primera_cuota_fecha)?;
        let tasa_mensual = input
            .tasa_mensual
            .as_ref()
            .map(|value| parse_rate(value, TermField::MonthlyRate))
            .transpose()?
            .unwrap_or(self.defaults.tasa_mensual);
        let gasto_admin = input
            .gasto_admin
            .as_ref()
            .map(|value| parse_rate(value, TermField::AdminFee))
            .transpose()?
            .unwrap_or(self.defaults.gasto_admin);
        let cuotas = input
            .cuotas
            .as_ref()
            .map(parse_installment_count)
            .transpose()?
            .unwrap_or(self.defaults.cuotas);
        let forma_pago = optional_text(input.forma_pago)
            .unwrap_or_else(|| self.defaults.forma_pago.clone());

        let schedule = ScheduleEngine::generate(&ScheduleTerms {
            principal: Decimal::from(monto),
            installment_count: i64::from(cuotas),
            monthly_rate: tasa_mensual,
            first_installment_date: primera_cuota_fecha,
        })?;

        let plan = Plan {
            id: PlanId::new(),
            plan_numero: optional_text(input.plan_numero),
            gestion: optional_text(input.gestion),
            nombre,
            dni,
            fecha_desembolso,
            monto,
            tasa_mensual,
            gasto_admin,
            cuotas,
            forma_pago,
            primera_cuota_fecha: Some(primera_cuota_fecha),
            schedule,
        };

        let mut collection = self.storage.load().await?;
        collection.plans.insert(plan.id, plan.clone());
        self.storage.replace(&collection).await?;

        Ok(plan)
    }

    /// Returns the stored plan with `id`.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::NotFound` if no such plan exists.
    pub async fn get_plan(&self, id: PlanId) -> Result<Plan, PlanError> {
        let mut collection = self.storage.load().await?;
        collection.plans.remove(&id).ok_or(PlanError::NotFound(id))
    }

    /// Lists plans in creation order.
    ///
    /// A non-blank `search` keeps only plans whose `nombre`, `dni`,
    /// `planNumero` or `gestion` contains it, ignoring case. Never writes.
    pub async fn list_plans(&self, search: Option<&str>) -> Result<Vec<Plan>, PlanError> {
        let collection = self.storage.load().await?;
        let needle = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        Ok(collection
            .plans
            .into_values()
            .filter(|plan| needle.as_deref().is_none_or(|n| plan.matches_search(n)))
            .collect())
    }

    /// Merges `patch` into the stored plan and persists the result.
    ///
    /// If the patch touches any field tagged for recompute (`monto`,
    /// `cuotas`, `tasaMensual`, `primeraCuotaFecha`), the schedule is rebuilt
    /// from the merged record. Otherwise the stored schedule is kept as is.
    /// Nothing is written when the update fails.
    ///
    /// # Errors
    ///
    /// - `PlanError::NotFound` if no such plan exists
    /// - `PlanError::MissingRequiredField` when a required field is blanked, or
    ///   a recompute is needed and the merged record has no first installment date
    /// - `PlanError::InvalidAmount` / `PlanError::InvalidTerms` for bad values
    /// - `PlanError::Storage` when the snapshot cannot be read or written
    pub async fn update_plan(&self, id: PlanId, patch: PlanPatch) -> Result<Plan, PlanError> {
        let mut collection = self.storage.load().await?;
        let current = collection.plans.get(&id).ok_or(PlanError::NotFound(id))?;

        let recompute = patch.requires_recompute();
        let mut updated = merge_patch(current.clone(), patch)?;

        if recompute {
            updated.schedule = ScheduleEngine::generate(&updated.schedule_terms()?)?;
        }

        collection.plans.insert(id, updated.clone());
        self.storage.replace(&collection).await?;

        Ok(updated)
    }

    /// Removes the plan with `id`. Removing an absent plan succeeds without
    /// writing.
    pub async fn delete_plan(&self, id: PlanId) -> Result<(), PlanError> {
        let mut collection = self.storage.load().await?;
        if collection.plans.remove(&id).is_some() {
            self.storage.replace(&collection).await?;
        }
        Ok(())
    }
}

fn merge_patch(mut plan: Plan, patch: PlanPatch) -> Result<Plan, PlanError> {
    if let Some(value) = patch.plan_numero {
        plan.plan_numero = optional_text(value);
    }
    if let Some(value) = patch.gestion {
        plan.gestion = optional_text(value);
    }
    if let Some(value) = patch.nombre {
        plan.nombre = required_text(value, PlanField::Nombre)?;
    }
    if let Some(value) = patch.dni {
        plan.dni = required_text(value, PlanField::Dni)?;
    }
    if let Some(value) = patch.fecha_desembolso {
        let value = required_text(value, PlanField::FechaDesembolso)?;
        plan.fecha_desembolso = parse_calendar_date(TermField::DisbursementDate, &value)?;
    }
    if let Some(value) = patch.monto {
        plan.monto = parse_amount(value.as_ref())?;
    }
    if let Some(value) = patch.tasa_mensual {
        let value = required_term(value, TermField::MonthlyRate)?;
        plan.tasa_mensual = parse_rate(&value, TermField::MonthlyRate)?;
    }
    if let Some(value) = patch.gasto_admin {
        let value = required_term(value, TermField::AdminFee)?;
        plan.gasto_admin = parse_rate(&value, TermField::AdminFee)?;
    }
    if let Some(value) = patch.cuotas {
        let value = required_term(value, TermField::InstallmentCount)?;
        plan.cuotas = parse_installment_count(&value)?;
    }
    if let Some(value) = patch.forma_pago {
        plan.forma_pago = required_text(value, PlanField::FormaPago)?;
    }
    if let Some(value) = patch.primera_cuota_fecha {
        plan.primera_cuota_fecha = optional_date(value, TermField::FirstInstallmentDate)?;
    }
    Ok(plan)
}

/// A financial term sent as `null` cannot be cleared.
fn required_term(value: Option<NumberInput>, field: TermField) -> Result<NumberInput, PlanError> {
    value.ok_or_else(|| ScheduleError::invalid(field, "is required").into())
}

fn required_text(value: Option<String>, field: PlanField) -> Result<String, PlanError> {
    optional_text(value).ok_or(PlanError::MissingRequiredField(field))
}

/// Blank strings count as absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn optional_date(value: Option<String>, field: TermField) -> Result<Option<NaiveDate>, PlanError> {
    optional_text(value)
        .map(|raw| parse_calendar_date(field, &raw))
        .transpose()
        .map_err(PlanError::from)
}

/// Converts a caller amount to whole units, rounding halves up.
fn parse_amount(value: Option<&NumberInput>) -> Result<i64, PlanError> {
    let value = value.ok_or_else(|| PlanError::InvalidAmount("monto is required".to_string()))?;
    let amount = value
        .as_decimal()
        .ok_or_else(|| PlanError::InvalidAmount(format!("{} is not a number", describe(value))))?;
    round_half_up(amount)
        .ok_or_else(|| PlanError::InvalidAmount(format!("{amount} is out of range")))
}

fn parse_rate(value: &NumberInput, field: TermField) -> Result<Decimal, PlanError> {
    value.as_decimal().ok_or_else(|| {
        ScheduleError::invalid(field, format!("{} is not a number", describe(value))).into()
    })
}

fn parse_installment_count(value: &NumberInput) -> Result<u32, PlanError> {
    value
        .as_decimal()
        .filter(|count| count.fract().is_zero() && count.is_sign_positive() && !count.is_zero())
        .and_then(|count| count.to_u32())
        .ok_or_else(|| {
            ScheduleError::invalid(
                TermField::InstallmentCount,
                format!("{} is not a positive integer", describe(value)),
            )
            .into()
        })
}

fn describe(value: &NumberInput) -> String {
    match value {
        NumberInput::Number(n) => n.to_string(),
        NumberInput::Other(other) => other.to_string(),
    }
}
