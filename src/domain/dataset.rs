// Dataset domain model - one aggregate per successful upload
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier assigned by the repository when a record is created.
/// Later uploads always receive larger identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub u64);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the raw upload kept in the artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

impl ArtifactRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Summary statistics computed from one uploaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: BTreeMap<String, u64>,
}

impl DatasetSummary {
    /// Summary of a table with a header and no rows.
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            avg_flowrate: 0.0,
            avg_pressure: 0.0,
            avg_temperature: 0.0,
            type_distribution: BTreeMap::new(),
        }
    }

    /// Distribution entries ordered by count (highest first), then label.
    pub fn ranked_distribution(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .type_distribution
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// A record that has not been assigned an identifier yet.
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub uploaded_at: DateTime<Utc>,
    pub artifact: Option<ArtifactRef>,
    pub summary: DatasetSummary,
}

/// A persisted dataset aggregate. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: DatasetId,
    #[serde(rename = "upload_time")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "original_csv")]
    pub artifact: Option<ArtifactRef>,
    #[serde(flatten)]
    pub summary: DatasetSummary,
}

impl DatasetRecord {
    pub fn from_new(id: DatasetId, new: NewDataset) -> Self {
        Self {
            id,
            uploaded_at: new.uploaded_at,
            artifact: new.artifact,
            summary: new.summary,
        }
    }

    /// Ordering key for history listings: newest upload first, and for
    /// identical timestamps the later insert first.
    pub fn recency_key(&self) -> (DateTime<Utc>, DatasetId) {
        (self.uploaded_at, self.id)
    }
}
