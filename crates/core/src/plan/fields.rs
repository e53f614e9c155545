//! Static metadata for patchable plan fields.
//!
//! Whether an update recomputes the schedule is decided by this table alone:
//! an update recomputes when any touched field is tagged `recompute`.

use std::fmt;

/// A caller-editable plan field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanField {
    /// Plan number label.
    PlanNumero,
    /// Management period label.
    Gestion,
    /// Borrower name.
    Nombre,
    /// Borrower identity document.
    Dni,
    /// Disbursement date.
    FechaDesembolso,
    /// Principal amount.
    Monto,
    /// Monthly interest rate.
    TasaMensual,
    /// Administrative fee rate.
    GastoAdmin,
    /// Installment count.
    Cuotas,
    /// Payment method label.
    FormaPago,
    /// First installment due date.
    PrimeraCuotaFecha,
}

/// Metadata for one patchable field.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// The field.
    pub field: PlanField,
    /// Wire name.
    pub name: &'static str,
    /// Touching this field rebuilds the schedule.
    pub recompute: bool,
}

/// Field table, in `PlanField` declaration order.
pub static PATCHABLE_FIELDS: [FieldMeta; 11] = [
    FieldMeta { field: PlanField::PlanNumero, name: "planNumero", recompute: false },
    FieldMeta { field: PlanField::Gestion, name: "gestion", recompute: false },
    FieldMeta { field: PlanField::Nombre, name: "nombre", recompute: false },
    FieldMeta { field: PlanField::Dni, name: "dni", recompute: false },
    FieldMeta { field: PlanField::FechaDesembolso, name: "fechaDesembolso", recompute: false },
    FieldMeta { field: PlanField::Monto, name: "monto", recompute: true },
    FieldMeta { field: PlanField::TasaMensual, name: "tasaMensual", recompute: true },
    FieldMeta { field: PlanField::GastoAdmin, name: "gastoAdmin", recompute: false },
    FieldMeta { field: PlanField::Cuotas, name: "cuotas", recompute: true },
    FieldMeta { field: PlanField::FormaPago, name: "formaPago", recompute: false },
    FieldMeta { field: PlanField::PrimeraCuotaFecha, name: "primeraCuotaFecha", recompute: true },
];

impl PlanField {
    /// Metadata row for this field.
    #[must_use]
    pub fn meta(self) -> &'static FieldMeta {
        &PATCHABLE_FIELDS[self as usize]
    }

    /// Wire name of the field.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.meta().name
    }

    /// Returns true if changing this field rebuilds the schedule.
    #[must_use]
    pub fn triggers_recompute(self) -> bool {
        self.meta().recompute
    }
}

impl fmt::Display for PlanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
