//! Durable plan records and the store that owns their schedules.

pub mod error;
pub mod fields;
pub mod service;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::PlanError;
pub use fields::{FieldMeta, PATCHABLE_FIELDS, PlanField};
pub use service::{PlanDefaults, PlanService};
pub use storage::{MemoryStorage, PlanCollection, PlanStorage, StorageError};
pub use types::{NewPlan, NumberInput, Plan, PlanPatch};
