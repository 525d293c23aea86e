pub mod api;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod enrich;
pub mod error;
pub mod query;
pub mod rates;
pub mod types;
