//! Durable storage for Planpago.
//!
//! Provides [`JsonFileStorage`], a [`planpago_core::plan::PlanStorage`]
//! backend that keeps the whole plan collection in one JSON snapshot file.

pub mod json_file;

pub use json_file::JsonFileStorage;
