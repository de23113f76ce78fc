//! Integration tests for `POST /fireworks` with a mock provider.

mod common;

use base64::{engine::general_purpose, Engine as _};
use common::{jpeg_bytes, test_config, transparent_png_bytes, TestApp, DEV_ORIGIN, JANE_DOE, PROD_ORIGIN};
use extraction_service::config::Environment;
use extraction_service::services::{MockProvider, ProviderError};
use reqwest::StatusCode;
use std::sync::Arc;

fn assert_cors(response: &reqwest::Response, origin: &str) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], origin);
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["access-control-allow-methods"], "POST,OPTIONS");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn valid_jpeg_returns_model_output_verbatim() {
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn(provider.clone()).await;

    let response = app.upload("licence.JPG", jpeg_bytes(320, 200)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response, DEV_ORIGIN);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        serde_json::json!({
            "status": "success",
            "message": "Image processed successfully",
            "response": JANE_DOE
        })
    );

    assert_eq!(provider.calls(), 1);
    let sent = provider.last_image().expect("provider saw no image");
    assert_eq!((sent.width, sent.height), (320, 200));
}

#[tokio::test]
async fn non_conforming_model_output_is_still_returned() {
    let provider = Arc::new(MockProvider::replying("not json at all"));
    let app = TestApp::spawn(provider).await;

    let response = app.upload("passport.png", transparent_png_bytes(64, 64)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "not json at all");
}

#[tokio::test]
async fn transparent_png_is_sent_as_opaque_jpeg() {
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn(provider.clone()).await;

    let response = app.upload("passport.png", transparent_png_bytes(64, 48)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sent = provider.last_image().unwrap();
    let jpeg = general_purpose::STANDARD.decode(&sent.base64).unwrap();
    let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
    assert!(!decoded.color().has_alpha());
    assert_eq!((decoded.width(), decoded.height()), (64, 48));

    let corner = decoded.to_rgb8().get_pixel(4, 24).0;
    assert!(corner.iter().all(|&c| c > 230), "{corner:?}");
}

#[tokio::test]
async fn invalid_extension_is_rejected() {
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn(provider.clone()).await;

    for name in ["scan.gif", "scan.pdf", "scan", "scan.png.txt"] {
        let response = app.upload(name, jpeg_bytes(8, 8)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{name}");
        assert_cors(&response, DEV_ORIGIN);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["message"],
            "Invalid image format. Must be PNG, JPG, or JPEG"
        );
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn empty_filename_is_rejected() {
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn(provider.clone()).await;

    let response = app.upload("", jpeg_bytes(8, 8)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response, DEV_ORIGIN);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "No selected image");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = TestApp::spawn(Arc::new(MockProvider::replying(JANE_DOE))).await;

    let form = reqwest::multipart::Form::new().text("note", "no image here");
    let response = app.post_form(form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No file part in the request");
}

#[tokio::test]
async fn non_multipart_body_gets_json_error() {
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn(provider.clone()).await;

    let response = app
        .client
        .post(format!("{}/fireworks", app.address))
        .header("content-type", "application/json")
        .body("{}")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response, DEV_ORIGIN);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to read multipart body"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn empty_post_gets_json_error() {
    let app = TestApp::spawn(Arc::new(MockProvider::replying(JANE_DOE))).await;

    let response = app
        .client
        .post(format!("{}/fireworks", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response, DEV_ORIGIN);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn undecodable_image_is_422() {
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn(provider.clone()).await;

    let response = app.upload("id.png", b"\x89PNG but not really".to_vec()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_cors(&response, DEV_ORIGIN);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Unable to decode image");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn provider_failure_is_502() {
    let provider = Arc::new(MockProvider::failing(|| ProviderError::Api {
        status: 500,
        body: "upstream exploded".to_string(),
    }));
    let app = TestApp::spawn(provider).await;

    let response = app.upload("id.jpeg", jpeg_bytes(16, 16)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_cors(&response, DEV_ORIGIN);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Inference provider error");
}

#[tokio::test]
async fn provider_rate_limit_is_429() {
    let app = TestApp::spawn(Arc::new(MockProvider::failing(|| ProviderError::RateLimited))).await;

    let response = app.upload("id.jpeg", jpeg_bytes(16, 16)).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn preflight_returns_cors_headers() {
    let app = TestApp::spawn(Arc::new(MockProvider::replying(JANE_DOE))).await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, format!("{}/fireworks", app.address))
        .header("Origin", DEV_ORIGIN)
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response, DEV_ORIGIN);
}

#[tokio::test]
async fn production_mode_uses_production_origin() {
    let config = test_config(Environment::Production, "http://unused");
    let app =
        TestApp::spawn_with_config(config, Arc::new(MockProvider::replying(JANE_DOE))).await;

    let ok = app.upload("id.jpg", jpeg_bytes(8, 8)).await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert_cors(&ok, PROD_ORIGIN);

    let rejected = app.upload("id.bmp", jpeg_bytes(8, 8)).await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_cors(&rejected, PROD_ORIGIN);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let mut config = test_config(Environment::Development, "http://unused");
    config.image.max_upload_bytes = 1024;
    let provider = Arc::new(MockProvider::replying(JANE_DOE));
    let app = TestApp::spawn_with_config(config, provider.clone()).await;

    let response = app.upload("big.png", vec![0u8; 8 * 1024]).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_cors(&response, DEV_ORIGIN);
    assert_eq!(provider.calls(), 0);
}
