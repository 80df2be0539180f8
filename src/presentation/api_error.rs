// Mapping of service errors onto HTTP responses
use crate::domain::error::DatasetError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// The multipart request did not carry a `file` field
    MissingFile,
    /// The multipart body could not be read
    InvalidUpload(String),
    Dataset(DatasetError),
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        ApiError::Dataset(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Dataset(DatasetError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Dataset(DatasetError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dataset(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::MissingFile => "CSV file is required.".to_string(),
            ApiError::InvalidUpload(reason) => format!("Invalid upload: {}", reason),
            ApiError::Dataset(DatasetError::NotFound(_)) => "Dataset not found".to_string(),
            ApiError::Dataset(DatasetError::Storage(_)) => "Internal storage error".to_string(),
            ApiError::Dataset(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Dataset(err) if !err.is_client_error() => tracing::error!("{}", err),
            other => tracing::warn!("Rejected request: {}", other.detail()),
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::DatasetId;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::MissingFile, StatusCode::BAD_REQUEST),
            (DatasetError::MalformedInput("x".into()).into(), StatusCode::BAD_REQUEST),
            (DatasetError::MissingColumns(vec!["type".into()]).into(), StatusCode::BAD_REQUEST),
            (DatasetError::Aggregation("x".into()).into(), StatusCode::BAD_REQUEST),
            (DatasetError::NotFound(DatasetId(1)).into(), StatusCode::NOT_FOUND),
            (
                DatasetError::Storage(anyhow::anyhow!("disk")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_storage_detail_hides_internals() {
        let err: ApiError = DatasetError::Storage(anyhow::anyhow!("/var/data/datasets.json locked")).into();
        assert_eq!(err.detail(), "Internal storage error");
    }

    #[test]
    fn test_missing_columns_detail() {
        let err: ApiError = DatasetError::MissingColumns(vec!["temperature".into(), "type".into()]).into();
        assert_eq!(err.detail(), "Missing required columns: temperature, type");
    }
}
