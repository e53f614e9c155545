//! Report view types.

use serde::Serialize;

/// Letterhead lines at the top of every report.
pub const LETTERHEAD: [&str; 2] = ["GRUPO SOLIDARIO", "HOY POR MI MAÑANA POR TI"];

/// Schedule table column headers.
pub const SCHEDULE_COLUMNS: [&str; 8] = [
    "N° de cuota",
    "Fecha",
    "Saldo",
    "Capital",
    "Interes",
    "Total",
    "Firma Solicitante",
    "Firma Responsable",
];

/// Label of the summary row.
pub const SUMMARY_LABEL: &str = "RESUMEN TOTAL:";

/// A labelled value in the borrower block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    /// Label, including the trailing colon.
    pub label: String,
    /// Formatted value.
    pub value: String,
}

/// One schedule line as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Installment number.
    pub cuota: u32,
    /// Due date, `dd-mm-yy`.
    pub fecha: String,
    /// Balance before the installment.
    pub saldo: i64,
    /// Principal portion.
    pub capital: i64,
    /// Interest portion.
    pub interes: i64,
    /// Amount due.
    pub total: i64,
}

/// Column totals as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Sum of principal.
    pub capital: i64,
    /// Sum of interest.
    pub interes: i64,
    /// Sum of amounts due.
    pub total: i64,
}

/// Printable view of one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    /// `PLAN DE PAGO: N° ...` line.
    pub title: String,
    /// `Gestión: ...` line.
    pub gestion: String,
    /// Borrower and terms block.
    pub fields: Vec<ReportField>,
    /// Schedule lines.
    pub rows: Vec<ReportRow>,
    /// Summary row.
    pub summary: ReportSummary,
}
