//! Mock provider for testing.

use super::{ExtractionProvider, ProviderError};
use crate::services::normalizer::NormalizedImage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum Outcome {
    Reply(String),
    Fail(fn() -> ProviderError),
}

/// Returns a canned reply (or a canned error) and remembers what it was sent.
pub struct MockProvider {
    outcome: Outcome,
    calls: AtomicUsize,
    last_image: Mutex<Option<NormalizedImage>>,
}

impl MockProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Reply(text.into()))
    }

    /// Fail every call with the error `make` produces.
    pub fn failing(make: fn() -> ProviderError) -> Self {
        Self::with_outcome(Outcome::Fail(make))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_image(&self) -> Option<NormalizedImage> {
        self.last_image
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExtractionProvider for MockProvider {
    async fn extract(&self, image: &NormalizedImage) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_image.lock() {
            *last = Some(image.clone());
        }

        match &self.outcome {
            Outcome::Reply(text) => Ok(text.clone()),
            Outcome::Fail(make) => Err(make()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.outcome {
            Outcome::Reply(_) => Ok(()),
            Outcome::Fail(make) => Err(make()),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
