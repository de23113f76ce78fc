use secrecy::SecretString;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_DEV_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_PROD_ORIGIN: &str = "https://www.withwell.com";
const DEFAULT_FIREWORKS_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";
const DEFAULT_FIREWORKS_MODEL: &str = "accounts/fireworks/models/llama-v3p2-90b-vision-instruct";

/// Matches the request timeout OpenAI-compatible clients apply when none is given.
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 600;

/// Deliberately aggressive: the model only needs legible text, not fidelity.
const DEFAULT_JPEG_QUALITY: u8 = 10;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub cors: CorsConfig,
    pub fireworks: FireworksConfig,
    pub image: ImageConfig,
}

/// Deployment mode. Only `development` is special; every other value is
/// treated as production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_mode(mode: &str) -> Self {
        if mode == "development" {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn is_prod(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub dev_origin: String,
    pub prod_origin: String,
}

#[derive(Debug, Clone)]
pub struct FireworksConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub jpeg_quality: u8,
    pub max_upload_bytes: usize,
}

impl ExtractionConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let environment =
            Environment::from_mode(&env::var("ENV").unwrap_or_else(|_| "development".to_string()));
        let is_prod = environment.is_prod();

        Ok(ExtractionConfig {
            common: common_config,
            environment,
            cors: CorsConfig {
                dev_origin: get_env_or("CORS_DEV_ORIGIN", DEFAULT_DEV_ORIGIN),
                prod_origin: get_env_or("CORS_PROD_ORIGIN", DEFAULT_PROD_ORIGIN),
            },
            fireworks: FireworksConfig {
                api_key: SecretString::new(get_env("FIREWORKS_API_KEY", None, is_prod)?),
                base_url: get_env_or("FIREWORKS_BASE_URL", DEFAULT_FIREWORKS_BASE_URL),
                model: get_env_or("FIREWORKS_MODEL", DEFAULT_FIREWORKS_MODEL),
                timeout_secs: parse_env(
                    "FIREWORKS_TIMEOUT_SECS",
                    DEFAULT_PROVIDER_TIMEOUT_SECS,
                )?,
            },
            image: ImageConfig {
                jpeg_quality: parse_quality("JPEG_QUALITY")?,
                max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
        })
    }

    /// The single origin allowed to call this service, picked by deployment mode.
    pub fn allowed_origin(&self) -> &str {
        match self.environment {
            Environment::Development => &self.cors.dev_origin,
            Environment::Production => &self.cors.prod_origin,
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Any non-negative integer is accepted and clamped to the encoder's 1..=100.
fn parse_quality(key: &str) -> Result<u8, AppError> {
    let raw: u32 = parse_env(key, u32::from(DEFAULT_JPEG_QUALITY))?;
    Ok(raw.clamp(1, 100) as u8)
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}
