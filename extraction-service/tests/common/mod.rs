#![allow(dead_code)]

use extraction_service::config::{
    CorsConfig, Environment, ExtractionConfig, FireworksConfig, ImageConfig,
};
use extraction_service::services::ExtractionProvider;
use extraction_service::startup::Application;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use secrecy::SecretString;
use service_core::config::Config as CoreConfig;
use std::io::Cursor;
use std::sync::Arc;

pub const DEV_ORIGIN: &str = "http://localhost:3000";
pub const PROD_ORIGIN: &str = "https://www.withwell.com";

pub const JANE_DOE: &str = r#"{"first_name":"Jane","last_name":"Doe","dob":"1990-01-31","doc_type":"passport","doc_number":"X1234567","expiry":"2030-06-01","country":"USA"}"#;

pub fn test_config(environment: Environment, base_url: &str) -> ExtractionConfig {
    ExtractionConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        environment,
        cors: CorsConfig {
            dev_origin: DEV_ORIGIN.to_string(),
            prod_origin: PROD_ORIGIN.to_string(),
        },
        fireworks: FireworksConfig {
            api_key: SecretString::new("fw-test-key".to_string()),
            base_url: base_url.to_string(),
            model: "accounts/fireworks/models/test-vision".to_string(),
            timeout_secs: 10,
        },
        image: ImageConfig {
            jpeg_quality: 10,
            max_upload_bytes: 5 * 1024 * 1024,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application with an injected provider.
    pub async fn spawn(provider: Arc<dyn ExtractionProvider>) -> Self {
        Self::spawn_with_config(test_config(Environment::Development, "http://unused"), provider)
            .await
    }

    pub async fn spawn_with_config(
        config: ExtractionConfig,
        provider: Arc<dyn ExtractionProvider>,
    ) -> Self {
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    /// Spawn the application wired to the real Fireworks adapter.
    pub async fn spawn_fireworks(config: ExtractionConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let port = app.port();
        tokio::spawn(async move {
            app.run_until_stopped(std::future::pending()).await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();

        // Wait for the server by polling the health endpoint
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp { address, client }
    }

    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.post_form(form).await
    }

    pub async fn post_form(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/fireworks", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])));
    encode(&image, ImageFormat::Jpeg)
}

/// Left half fully transparent, right half opaque blue.
pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    encode(&DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}
