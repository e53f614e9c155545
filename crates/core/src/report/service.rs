//! Report building and CSV rendering.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::ReportError;
use super::types::{
    LETTERHEAD, PlanReport, ReportField, ReportRow, ReportSummary, SCHEDULE_COLUMNS,
    SUMMARY_LABEL,
};
use crate::plan::Plan;
use crate::schedule::format_display_date;

/// Service for building printable plan reports.
pub struct ReportService;

impl ReportService {
    /// Builds the printable view of a plan from its stored schedule.
    ///
    /// Rates are shown as percentages rounded to two decimals.
    #[must_use]
    pub fn build(plan: &Plan) -> PlanReport {
        let field = |label: &str, value: String| ReportField {
            label: label.to_string(),
            value,
        };

        let fields = vec![
            field("Nombre:", plan.nombre.clone()),
            field("DNI:", plan.dni.clone()),
            field(
                "Fecha de desembolso:",
                format_display_date(plan.fecha_desembolso),
            ),
            field("Monto del préstamo:", plan.monto.to_string()),
            field("Interés Mensual:", format_percent(plan.tasa_mensual)),
            field("Gastos Administrativos:", format_percent(plan.gasto_admin)),
            field("Tiempo de préstamo:", format!("{} meses", plan.cuotas)),
            field("Forma de Pago:", plan.forma_pago.clone()),
        ];

        let rows = plan
            .schedule
            .rows
            .iter()
            .map(|row| ReportRow {
                cuota: row.cuota,
                fecha: row.fecha.clone(),
                saldo: row.saldo,
                capital: row.capital,
                interes: row.interes,
                total: row.total,
            })
            .collect();

        PlanReport {
            title: format!("PLAN DE PAGO: N° {}", label_or_dash(plan.plan_numero.as_deref())),
            gestion: format!("Gestión: {}", label_or_dash(plan.gestion.as_deref())),
            fields,
            rows,
            summary: ReportSummary {
                capital: plan.schedule.sum_capital,
                interes: plan.schedule.sum_interes,
                total: plan.schedule.sum_total,
            },
        }
    }

    /// Renders a report as CSV.
    ///
    /// Records have varying widths: letterhead lines are single cells, the
    /// borrower block is label/value pairs, and the schedule table uses
    /// [`SCHEDULE_COLUMNS`].
    pub fn render_csv(report: &PlanReport) -> Result<Vec<u8>, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        for line in LETTERHEAD {
            writer.write_record([line])?;
        }
        writer.write_record([report.title.as_str()])?;
        writer.write_record([report.gestion.as_str()])?;

        for field in &report.fields {
            writer.write_record([field.label.as_str(), field.value.as_str()])?;
        }

        writer.write_record(SCHEDULE_COLUMNS)?;
        for row in &report.rows {
            writer.write_record([
                row.cuota.to_string(),
                row.fecha.clone(),
                row.saldo.to_string(),
                row.capital.to_string(),
                row.interes.to_string(),
                row.total.to_string(),
                String::new(),
                String::new(),
            ])?;
        }

        writer.write_record([
            SUMMARY_LABEL.to_string(),
            String::new(),
            String::new(),
            report.summary.capital.to_string(),
            report.summary.interes.to_string(),
            report.summary.total.to_string(),
        ])?;

        writer
            .into_inner()
            .map_err(|e| ReportError::Flush(e.error().to_string()))
    }

    /// Builds and renders a plan in one step.
    pub fn export_csv(plan: &Plan) -> Result<Vec<u8>, ReportError> {
        Self::render_csv(&Self::build(plan))
    }

    /// Download file name for a plan export.
    #[must_use]
    pub fn file_name(plan: &Plan) -> String {
        format!("plan_{}.csv", plan.id)
    }
}

fn label_or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Formats a fractional rate as a percentage with at most two decimals,
/// halves rounded away from zero.
#[must_use]
pub fn format_percent(rate: Decimal) -> String {
    rate.checked_mul(Decimal::ONE_HUNDRED)
        .map_or_else(|| rate.to_string(), |pct| {
            pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
                .to_string()
        })
        + "%"
}
