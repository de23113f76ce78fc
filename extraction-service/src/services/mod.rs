pub mod metrics;
pub mod normalizer;
pub mod providers;

pub use self::metrics::{get_metrics, init_metrics};
pub use normalizer::{ImageNormalizer, NormalizedImage};
pub use providers::{ExtractionProvider, FireworksProvider, MockProvider, ProviderError};
