// Route table for the dataset API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    delete_dataset, download_report, get_summary, health_check, list_history, upload_dataset,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/upload/", post(upload_dataset))
        .route("/api/summary/:id/", get(get_summary))
        .route("/api/history/", get(list_history))
        .route("/api/report/:id/", get(download_report))
        .route("/api/datasets/:id/", delete(delete_dataset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
