// HTTP request handlers
use crate::domain::dataset::DatasetId;
use crate::infrastructure::http_response::{accepts_brotli, json_response, pdf_attachment_response};
use crate::infrastructure::pdf_report::render_report;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

const UPLOAD_FIELD: &str = "file";
const DEFAULT_UPLOAD_NAME: &str = "upload.csv";

async fn respond_json<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Ingest an uploaded CSV file
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidUpload(e.body_text()))?;
        upload = Some((file_name, contents));
        break;
    }

    let (file_name, contents) = upload.ok_or(ApiError::MissingFile)?;
    let record = state.dataset_service.ingest(&file_name, contents).await?;

    Ok(respond_json(StatusCode::CREATED, &record, &headers).await)
}

/// Fetch one dataset summary
pub async fn get_summary(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let record = state.dataset_service.get(DatasetId(id)).await?;
    Ok(respond_json(StatusCode::OK, &record, &headers).await)
}

/// List the most recent uploads
pub async fn list_history(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let records = state.dataset_service.history().await?;
    Ok(respond_json(StatusCode::OK, &records, &headers).await)
}

/// Download the PDF report of one dataset
pub async fn download_report(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let record = state.dataset_service.get(DatasetId(id)).await?;
    let pdf = render_report(&record);
    let filename = format!("dataset_{}_report.pdf", record.id);

    Ok(match pdf_attachment_response(pdf, &filename) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    })
}

/// Administrative delete of one dataset and its upload
pub async fn delete_dataset(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.dataset_service.delete(DatasetId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
