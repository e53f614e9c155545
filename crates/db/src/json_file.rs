//! JSON snapshot file storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use planpago_core::plan::{PlanCollection, PlanStorage, StorageError};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stores the plan collection as one pretty-printed JSON document.
///
/// Writes go to a sibling temporary file which is synced and then renamed
/// over the snapshot, so a crash leaves either the old or the new snapshot.
/// A missing file is created as an empty collection on first load. Temp files
/// orphaned by a crash are swept on that lazy init and by
/// [`JsonFileStorage::remove_stale_temp_files`].
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates storage for the snapshot at `path`. Nothing is touched until
    /// the first load or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes `<snapshot>.<id>.tmp` siblings left behind by interrupted
    /// writes and returns how many were removed.
    ///
    /// Only call this while no write is in flight, such as at start-up.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be read or a temp
    /// file cannot be removed.
    pub async fn remove_stale_temp_files(&self) -> Result<usize, StorageError> {
        let Some(file_name) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Ok(0);
        };
        let prefix = format!("{file_name}.");
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&prefix) && name.ends_with(".tmp") {
                fs::remove_file(entry.path()).await?;
                debug!(path = %entry.path().display(), "Removed stale temp file");
                removed += 1;
            }
        }

        if removed > 0 {
            info!(path = %self.path.display(), removed, "Swept stale snapshot temp files");
        }
        Ok(removed)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        PathBuf::from(name)
    }

    async fn write_snapshot(&self, collection: &PlanCollection) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(collection)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        let result = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, &self.path).await
        }
        .await;

        if let Err(e) = result {
            warn!(path = %temp.display(), error = %e, "Snapshot write failed");
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(
            path = %self.path.display(),
            plans = collection.plans.len(),
            bytes = bytes.len(),
            "Snapshot written"
        );
        Ok(())
    }
}

#[async_trait]
impl PlanStorage for JsonFileStorage {
    async fn load(&self) -> Result<PlanCollection, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "Snapshot is corrupt");
                StorageError::Corrupt(e.to_string())
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Initializing empty snapshot");
                self.remove_stale_temp_files().await?;
                let empty = PlanCollection::default();
                self.write_snapshot(&empty).await?;
                Ok(empty)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, collection: &PlanCollection) -> Result<(), StorageError> {
        self.write_snapshot(collection).await
    }
}
