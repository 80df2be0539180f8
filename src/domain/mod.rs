// Domain layer - Dataset aggregates and their views
pub mod chart;
pub mod dataset;
pub mod error;
