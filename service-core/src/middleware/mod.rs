pub mod cors;
pub mod metrics;
pub mod security_headers;
pub mod tracing;

pub use cors::{CorsPolicy, cors_middleware};
