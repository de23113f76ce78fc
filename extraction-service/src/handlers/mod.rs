//! HTTP handlers for the extraction service.

pub mod extract;
pub mod health;

pub use extract::extract_document;
pub use health::{health_check, metrics_endpoint};
