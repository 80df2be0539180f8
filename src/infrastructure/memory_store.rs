// In-memory dataset and artifact stores
use crate::application::dataset_repository::{ArtifactStore, DatasetRepository, ListOrder};
use crate::domain::dataset::{ArtifactRef, DatasetId, DatasetRecord, NewDataset};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    records: Vec<DatasetRecord>,
}

/// Dataset repository that lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryDatasetRepository {
    state: Mutex<MemoryState>,
}

impl MemoryDatasetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("dataset store lock poisoned"))
    }
}

#[async_trait]
impl DatasetRepository for MemoryDatasetRepository {
    async fn create(&self, dataset: NewDataset) -> Result<DatasetRecord> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let record = DatasetRecord::from_new(DatasetId(state.next_id), dataset);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: DatasetId) -> Result<Option<DatasetRecord>> {
        let state = self.lock()?;
        Ok(state.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, order: ListOrder, limit: Option<usize>) -> Result<Vec<DatasetRecord>> {
        let mut records = self.lock()?.records.clone();
        order.sort(&mut records);
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn delete(&self, id: DatasetId) -> Result<bool> {
        let mut state = self.lock()?;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        Ok(state.records.len() != before)
    }
}

/// Artifact store keeping uploads in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    files: Mutex<HashMap<ArtifactRef, Bytes>>,
    sequence: AtomicU64,
    fail_deletes: AtomicBool,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following delete fail, as an unavailable backend would.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or_default()
    }

    fn files(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ArtifactRef, Bytes>>> {
        self.files
            .lock()
            .map_err(|_| anyhow::anyhow!("artifact store lock poisoned"))
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(&self, file_name: &str, contents: Bytes) -> Result<ArtifactRef> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let artifact = ArtifactRef(format!("memory/{}/{}", sequence, file_name));
        self.files()?.insert(artifact.clone(), contents);
        Ok(artifact)
    }

    async fn delete(&self, artifact: &ArtifactRef) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("artifact backend unavailable");
        }
        self.files()?.remove(artifact);
        Ok(())
    }

    async fn exists(&self, artifact: &ArtifactRef) -> Result<bool> {
        Ok(self.files()?.contains_key(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::DatasetSummary;
    use chrono::Utc;

    fn new_dataset() -> NewDataset {
        NewDataset {
            uploaded_at: Utc::now(),
            artifact: None,
            summary: DatasetSummary::empty(),
        }
    }

    #[tokio::test]
    async fn test_identifiers_increase_after_deletes() {
        let repository = MemoryDatasetRepository::new();
        let first = repository.create(new_dataset()).await.unwrap();
        assert!(repository.delete(first.id).await.unwrap());
        let second = repository.create(new_dataset()).await.unwrap();

        assert!(second.id > first.id);
        assert!(!repository.delete(first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_applies_limit_after_ordering() {
        let repository = MemoryDatasetRepository::new();
        for _ in 0..3 {
            repository.create(new_dataset()).await.unwrap();
        }

        let newest = repository.list(ListOrder::NewestFirst, Some(1)).await.unwrap();
        let oldest = repository.list(ListOrder::OldestFirst, Some(1)).await.unwrap();

        assert_eq!(newest[0].id, DatasetId(3));
        assert_eq!(oldest[0].id, DatasetId(1));
    }

    #[tokio::test]
    async fn test_artifact_delete_is_idempotent() {
        let store = MemoryArtifactStore::new();
        let artifact = store.put("a.csv", Bytes::from_static(b"x")).await.unwrap();

        store.delete(&artifact).await.unwrap();
        store.delete(&artifact).await.unwrap();

        assert!(!store.exists(&artifact).await.unwrap());
    }
}
