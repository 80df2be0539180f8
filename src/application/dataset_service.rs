// Dataset service - Use cases for ingesting and reading uploads
use crate::application::aggregator::aggregate;
use crate::application::dataset_repository::{ArtifactStore, DatasetRepository, ListOrder};
use crate::application::retention::{RetentionManager, RetentionReport};
use crate::application::validator::validate;
use crate::domain::dataset::{DatasetId, DatasetRecord, NewDataset};
use crate::domain::error::DatasetError;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DatasetService {
    repository: Arc<dyn DatasetRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    retention: RetentionManager,
    // Held across insert-then-trim and deletes so concurrent uploads cannot
    // leave more than `limit` records behind.
    write_lock: Arc<Mutex<()>>,
}

impl DatasetService {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        retention_limit: usize,
    ) -> Self {
        let retention = RetentionManager::new(repository.clone(), artifacts.clone(), retention_limit);
        Self {
            repository,
            artifacts,
            retention,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Validate, aggregate and persist one upload, then trim the history.
    ///
    /// Nothing is written unless the file validates and aggregates.
    pub async fn ingest(&self, file_name: &str, contents: Bytes) -> Result<DatasetRecord, DatasetError> {
        let table = validate(&contents)?;
        let summary = aggregate(&table)?;

        let _guard = self.write_lock.lock().await;

        let artifact = self
            .artifacts
            .put(file_name, contents)
            .await
            .map_err(DatasetError::Storage)?;

        let new_dataset = NewDataset {
            uploaded_at: Utc::now(),
            artifact: Some(artifact.clone()),
            summary,
        };

        let record = match self.repository.create(new_dataset).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = self.artifacts.delete(&artifact).await {
                    tracing::warn!("Failed to release artifact {} after failed insert: {:#}", artifact, cleanup);
                }
                return Err(DatasetError::Storage(e));
            }
        };

        tracing::info!(
            "Stored dataset {} from {} ({} rows)",
            record.id,
            file_name,
            record.summary.total_count
        );

        // The new record stays even if trimming fails
        match self.retention.enforce().await {
            Ok(report) if !report.is_clean() => {
                tracing::warn!("Retention pass after dataset {} was incomplete: {:?}", record.id, report);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Retention pass after dataset {} failed: {:#}", record.id, e),
        }

        Ok(record)
    }

    pub async fn get(&self, id: DatasetId) -> Result<DatasetRecord, DatasetError> {
        self.repository
            .get(id)
            .await
            .map_err(DatasetError::Storage)?
            .ok_or(DatasetError::NotFound(id))
    }

    /// Most recent uploads, newest first, bounded by the retention limit.
    pub async fn history(&self) -> Result<Vec<DatasetRecord>, DatasetError> {
        self.repository
            .list(ListOrder::NewestFirst, Some(self.retention.limit()))
            .await
            .map_err(DatasetError::Storage)
    }

    /// Administrative delete of one record and its artifact.
    pub async fn delete(&self, id: DatasetId) -> Result<(), DatasetError> {
        let _guard = self.write_lock.lock().await;

        let record = self.get(id).await?;
        let removal = self.retention.remove(&record).await;
        if !removal.record_deleted {
            return Err(DatasetError::Storage(anyhow::anyhow!(
                "dataset {} could not be deleted",
                id
            )));
        }

        tracing::info!("Deleted dataset {}", id);
        Ok(())
    }

    /// Run a retention pass outside of an upload.
    pub async fn enforce_retention(&self) -> Result<RetentionReport, DatasetError> {
        let _guard = self.write_lock.lock().await;
        self.retention.enforce().await.map_err(DatasetError::Storage)
    }
}
