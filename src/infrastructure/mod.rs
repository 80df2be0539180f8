// Infrastructure layer - External dependencies and adapters
pub mod api_client;
pub mod client_settings;
pub mod config;
pub mod fs_store;
pub mod http_response;
pub mod memory_store;
pub mod pdf_report;
