//! Amortization schedule generation.
//!
//! Pure computation with no I/O or shared state: loan terms in, installment
//! rows and totals out.

pub mod engine;
pub mod error;
pub mod types;


pub use engine::{
    MAX_INSTALLMENTS, ScheduleEngine, format_display_date, parse_calendar_date, round_half_up,
};
pub use error::{ScheduleError, TermField};
pub use types::{Schedule, ScheduleRow, ScheduleTerms};
