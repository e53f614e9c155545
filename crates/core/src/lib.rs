//! Core business logic for Planpago.
//!
//! This crate contains pure business logic with ZERO web or filesystem dependencies.
//! Durable storage is reached only through the [`plan::PlanStorage`] trait.
//!
//! # Modules
//!
//! - `schedule` - Amortization schedule engine
//! - `plan` - Plan records, validation and the plan store service
//! - `report` - Printable plan report and CSV export

pub mod plan;
pub mod report;
pub mod schedule;
