//! Data models: student records and pipeline configuration.

pub mod config;
pub mod record;
