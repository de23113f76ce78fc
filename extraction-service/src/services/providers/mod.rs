//! Vision model provider abstraction.
//!
//! The HTTP layer only ever talks to [`ExtractionProvider`], so the hosted
//! backend can be swapped (or mocked in tests) without touching handlers.

pub mod fireworks;
pub mod mock;

use crate::services::normalizer::NormalizedImage;
use async_trait::async_trait;
use thiserror::Error;

pub use fireworks::FireworksProvider;
pub use mock::MockProvider;

/// System instruction sent with every extraction request.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that specializes in analyzing images and providing detailed, accurate descriptions. Focus on text and important details present in the image. If a field is not present in the image, leave it blank.";

/// User instruction that accompanies the inline image.
pub const USER_PROMPT: &str =
    "Please analyze this image and extract the information of the person in the image";

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Short stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Network(_) => "network",
            ProviderError::Unauthorized(_) => "unauthorized",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Api { .. } => "api",
            ProviderError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// A hosted model that turns an identity-document image into Person JSON.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Submit one image and return the raw text of the first completion.
    /// The text is not parsed or validated.
    async fn extract(&self, image: &NormalizedImage) -> Result<String, ProviderError>;

    /// Cheap readiness check. Does not call the remote API.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Model identifier, for logs and metrics.
    fn model(&self) -> &str;
}
