//! Storage seam for the plan collection.
//!
//! Backends persist the whole collection as one snapshot: every write replaces
//! the previous snapshot entirely, and readers see either the old or the new
//! snapshot, never a mix.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use planpago_shared::types::PlanId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use super::types::Plan;

/// The full set of stored plans, keyed by id.
///
/// Ids are time-ordered, so iteration yields plans in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCollection {
    /// Plans by id.
    #[serde(default)]
    pub plans: BTreeMap<PlanId, Plan>,
}

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored snapshot could not be decoded.
    #[error("stored snapshot is corrupt: {0}")]
    Corrupt(String),

    /// The collection could not be encoded.
    #[error("snapshot encoding failed: {0}")]
    Serialize(String),
}

/// Durable home of the plan collection.
#[async_trait]
pub trait PlanStorage: Send + Sync {
    /// Reads the current snapshot. A store that was never written yields an
    /// empty collection.
    async fn load(&self) -> Result<PlanCollection, StorageError>;

    /// Replaces the stored snapshot with `collection`.
    async fn replace(&self, collection: &PlanCollection) -> Result<(), StorageError>;
}

/// In-process storage backed by a lock-guarded collection.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collection: RwLock<PlanCollection>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `plans`.
    #[must_use]
    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        let plans = plans.into_iter().map(|plan| (plan.id, plan)).collect();
        Self {
            collection: RwLock::new(PlanCollection { plans }),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of snapshot writes performed so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanStorage for MemoryStorage {
    async fn load(&self) -> Result<PlanCollection, StorageError> {
        Ok(self.collection.read().await.clone())
    }

    async fn replace(&self, collection: &PlanCollection) -> Result<(), StorageError> {
        *self.collection.write().await = collection.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
