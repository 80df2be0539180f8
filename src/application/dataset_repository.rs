// Storage traits for dataset records and raw upload artifacts
use crate::domain::dataset::{ArtifactRef, DatasetId, DatasetRecord, NewDataset};
use async_trait::async_trait;
use bytes::Bytes;

/// Order of a record listing. Every listing names one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// `upload_time` descending, later identifiers first on ties
    NewestFirst,
    /// `upload_time` ascending, earlier identifiers first on ties
    OldestFirst,
}

impl ListOrder {
    /// Sort records in place according to this order.
    pub fn sort(self, records: &mut [DatasetRecord]) {
        match self {
            ListOrder::NewestFirst => records.sort_by(|a, b| b.recency_key().cmp(&a.recency_key())),
            ListOrder::OldestFirst => records.sort_by_key(DatasetRecord::recency_key),
        }
    }
}

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Persist a new record, assigning the next identifier
    async fn create(&self, dataset: NewDataset) -> anyhow::Result<DatasetRecord>;

    /// Fetch one record
    async fn get(&self, id: DatasetId) -> anyhow::Result<Option<DatasetRecord>>;

    /// List records in the given order, optionally bounded
    async fn list(&self, order: ListOrder, limit: Option<usize>) -> anyhow::Result<Vec<DatasetRecord>>;

    /// Delete a record. Returns false if it did not exist.
    async fn delete(&self, id: DatasetId) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store the raw upload under a name derived from `file_name`
    async fn put(&self, file_name: &str, contents: Bytes) -> anyhow::Result<ArtifactRef>;

    /// Release an artifact. Releasing a missing artifact succeeds.
    async fn delete(&self, artifact: &ArtifactRef) -> anyhow::Result<()>;

    /// Whether the artifact is still reachable
    async fn exists(&self, artifact: &ArtifactRef) -> anyhow::Result<bool>;
}
