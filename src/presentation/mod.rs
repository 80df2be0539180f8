// Presentation layer - HTTP surface and terminal views
pub mod api_error;
pub mod app_state;
pub mod handlers;
pub mod router;
pub mod summary_view;
