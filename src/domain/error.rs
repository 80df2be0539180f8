// Error taxonomy for dataset ingestion and lookup
use super::dataset::DatasetId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Unable to parse CSV: {0}")]
    MalformedInput(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unable to aggregate CSV: {0}")]
    Aggregation(String),

    #[error("Dataset {0} not found")]
    NotFound(DatasetId),

    #[error("Storage error: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl DatasetError {
    /// True for errors caused by the uploaded content rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DatasetError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_every_column() {
        let err = DatasetError::MissingColumns(vec!["pressure".to_string(), "type".to_string()]);
        assert_eq!(err.to_string(), "Missing required columns: pressure, type");
    }

    #[test]
    fn test_storage_message_includes_context_chain() {
        let source = anyhow::anyhow!("disk full").context("Failed to write dataset index");
        let err = DatasetError::Storage(source);

        assert_eq!(
            err.to_string(),
            "Storage error: Failed to write dataset index: disk full"
        );
        assert!(!err.is_client_error());
    }
}
