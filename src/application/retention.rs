// Retention manager - keeps only the most recent uploads
use crate::application::dataset_repository::{ArtifactStore, DatasetRepository, ListOrder};
use crate::domain::dataset::{DatasetId, DatasetRecord};
use std::sync::Arc;

pub const DEFAULT_RETENTION_LIMIT: usize = 5;

/// Outcome of one retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Records deleted by this pass
    pub evicted: Vec<DatasetId>,
    /// Records whose artifact could not be released
    pub artifact_failures: Vec<DatasetId>,
    /// Records that could not be deleted
    pub record_failures: Vec<DatasetId>,
}

impl RetentionReport {
    pub fn is_clean(&self) -> bool {
        self.artifact_failures.is_empty() && self.record_failures.is_empty()
    }
}

/// Result of removing one record together with its artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub artifact_released: bool,
    pub record_deleted: bool,
}

#[derive(Clone)]
pub struct RetentionManager {
    repository: Arc<dyn DatasetRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    limit: usize,
}

impl RetentionManager {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        limit: usize,
    ) -> Self {
        Self {
            repository,
            artifacts,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Evict every record beyond the `limit` most recent ones.
    ///
    /// A failure to release one artifact or delete one record is logged and
    /// reported; the pass carries on with the remaining records. Only a
    /// failure to list the records aborts it.
    ///
    /// Callers must serialise passes; see `DatasetService`.
    pub async fn enforce(&self) -> anyhow::Result<RetentionReport> {
        let records = self.repository.list(ListOrder::OldestFirst, None).await?;
        let mut report = RetentionReport::default();

        let excess = records.len().saturating_sub(self.limit);
        if excess == 0 {
            return Ok(report);
        }

        // Oldest first, so an interrupted pass has already dropped the stalest records
        for record in records.into_iter().take(excess) {
            let removal = self.remove(&record).await;
            if !removal.artifact_released {
                report.artifact_failures.push(record.id);
            }
            if removal.record_deleted {
                report.evicted.push(record.id);
            } else {
                report.record_failures.push(record.id);
            }
        }

        tracing::info!(
            "Retention pass evicted {} datasets (limit {})",
            report.evicted.len(),
            self.limit
        );

        Ok(report)
    }

    /// Release the record's artifact, then delete the record. The record
    /// delete is attempted even when the artifact release fails.
    pub async fn remove(&self, record: &DatasetRecord) -> Removal {
        let artifact_released = match &record.artifact {
            Some(artifact) => match self.artifacts.delete(artifact).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "Failed to release artifact {} of dataset {}: {:#}",
                        artifact,
                        record.id,
                        e
                    );
                    false
                }
            },
            None => true,
        };

        let record_deleted = match self.repository.delete(record.id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Failed to delete dataset {}: {:#}", record.id, e);
                false
            }
        };

        Removal {
            artifact_released,
            record_deleted,
        }
    }
}
