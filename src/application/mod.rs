// Application layer - Ingestion pipeline and use cases
pub mod aggregator;
pub mod dataset_repository;
pub mod dataset_service;
pub mod retention;
pub mod validator;
