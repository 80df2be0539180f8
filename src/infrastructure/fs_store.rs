// Filesystem-backed dataset index and upload storage
use crate::application::dataset_repository::{ArtifactStore, DatasetRepository, ListOrder};
use crate::domain::dataset::{ArtifactRef, DatasetId, DatasetRecord, NewDataset};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const INDEX_FILE: &str = "datasets.json";
const UPLOAD_DIR: &str = "uploads";
const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DatasetIndex {
    next_id: u64,
    records: Vec<DatasetRecord>,
}

/// Dataset records kept in a single JSON index under the data directory.
///
/// Every mutation rewrites the index through a temporary file and a rename,
/// so readers never observe a half-written index.
#[derive(Debug)]
pub struct FsDatasetRepository {
    index_path: PathBuf,
    index: Mutex<DatasetIndex>,
}

impl FsDatasetRepository {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let index_path = data_dir.join(INDEX_FILE);
        let index = match tokio::fs::read(&index_path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .with_context(|| format!("Failed to parse dataset index {}", index_path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => DatasetIndex::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read dataset index {}", index_path.display()));
            }
        };

        tracing::info!(
            "Opened dataset index {} with {} records",
            index_path.display(),
            index.records.len()
        );

        Ok(Self {
            index_path,
            index: Mutex::new(index),
        })
    }

    async fn persist(&self, index: &DatasetIndex) -> Result<()> {
        let raw = serde_json::to_vec_pretty(index).context("Failed to serialize dataset index")?;
        let tmp_path = self.index_path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, raw)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.index_path)
            .await
            .with_context(|| format!("Failed to replace {}", self.index_path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl DatasetRepository for FsDatasetRepository {
    async fn create(&self, dataset: NewDataset) -> Result<DatasetRecord> {
        let mut index = self.index.lock().await;

        let mut updated = index.clone();
        updated.next_id += 1;
        let record = DatasetRecord::from_new(DatasetId(updated.next_id), dataset);
        updated.records.push(record.clone());

        self.persist(&updated).await?;
        *index = updated;
        Ok(record)
    }

    async fn get(&self, id: DatasetId) -> Result<Option<DatasetRecord>> {
        let index = self.index.lock().await;
        Ok(index.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, order: ListOrder, limit: Option<usize>) -> Result<Vec<DatasetRecord>> {
        let mut records = self.index.lock().await.records.clone();
        order.sort(&mut records);
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn delete(&self, id: DatasetId) -> Result<bool> {
        let mut index = self.index.lock().await;
        if !index.records.iter().any(|r| r.id == id) {
            return Ok(false);
        }

        let mut updated = index.clone();
        updated.records.retain(|r| r.id != id);

        self.persist(&updated).await?;
        *index = updated;
        Ok(true)
    }
}

/// Raw uploads stored as files under `<data_dir>/uploads`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    data_dir: PathBuf,
}

impl FsArtifactStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let upload_dir = data_dir.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&upload_dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", upload_dir.display()))?;
        Ok(Self { data_dir })
    }

    /// Map a reference back to its file, rejecting anything outside the upload directory.
    fn resolve(&self, artifact: &ArtifactRef) -> Result<PathBuf> {
        let relative = Path::new(artifact.as_str());
        let mut components = relative.components();

        match (components.next(), components.next(), components.next()) {
            (Some(Component::Normal(dir)), Some(Component::Normal(_)), None) if dir == UPLOAD_DIR => {
                Ok(self.data_dir.join(relative))
            }
            _ => anyhow::bail!("Invalid artifact reference: {}", artifact),
        }
    }
}

/// Reduce an uploaded file name to a safe `stem` and `extension`.
fn sanitize_file_name(file_name: &str) -> (String, String) {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    let (stem, extension) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
        _ => (cleaned, "csv"),
    };

    let stem = if stem.is_empty() { "upload" } else { stem };
    (stem.to_string(), extension.to_string())
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, file_name: &str, contents: Bytes) -> Result<ArtifactRef> {
        let (stem, extension) = sanitize_file_name(file_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}_{}.{}", stem, attempt, extension)
            };
            let path = self.data_dir.join(UPLOAD_DIR).join(&name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()));
                }
            };

            file.write_all(&contents)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            file.flush().await?;

            tracing::debug!("Stored upload {} ({} bytes)", path.display(), contents.len());
            return Ok(ArtifactRef(format!("{}/{}", UPLOAD_DIR, name)));
        }

        anyhow::bail!("No free file name for upload {}", file_name)
    }

    async fn delete(&self, artifact: &ArtifactRef) -> Result<()> {
        let path = self.resolve(artifact)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    async fn exists(&self, artifact: &ArtifactRef) -> Result<bool> {
        let path = self.resolve(artifact)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
