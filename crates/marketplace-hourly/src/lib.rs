pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod telemetry;
