use crate::dtos::ExtractionResponse;
use crate::error::ExtractionError;
use crate::models::Person;
use crate::services::metrics;
use crate::services::normalizer::{validate_filename, NormalizedImage, ValidationError};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use std::time::Instant;

/// Multipart field carrying the document image.
const FILE_FIELD: &str = "file";

/// `POST /fireworks`: upload an identity document, get the model's JSON back.
pub async fn extract_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ExtractionError> {
    let result = match multipart {
        Ok(multipart) => run_extraction(&state, multipart).await,
        Err(rejection) => Err(rejection.into()),
    };

    match &result {
        Ok(_) => metrics::record_outcome("success"),
        Err(e) => metrics::record_outcome(e.outcome()),
    }

    result.map(Json)
}

async fn run_extraction(
    state: &AppState,
    multipart: Multipart,
) -> Result<ExtractionResponse, ExtractionError> {
    let (filename, data) = read_upload(multipart).await?;

    tracing::info!(
        filename = %filename,
        size = data.len(),
        "Document upload received"
    );

    let image = normalize(state, data).await?;
    metrics::record_payload_bytes(image.jpeg_len);

    tracing::debug!(
        width = image.width,
        height = image.height,
        jpeg_bytes = image.jpeg_len,
        "Image normalized"
    );

    let started = Instant::now();
    let result = state.provider.extract(&image).await;
    metrics::record_provider_latency(state.provider.model(), started.elapsed());
    let content = result?;

    if let Err(e) = Person::parse(&content) {
        metrics::record_schema_mismatch();
        tracing::warn!(
            error = %e,
            model = %state.provider.model(),
            "Model output does not match the Person schema; returning it unchanged"
        );
    }

    tracing::info!(
        model = %state.provider.model(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Extraction completed"
    );

    Ok(ExtractionResponse::success(content))
}

/// Find the `file` part, check its name, then read it. Other parts are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), ExtractionError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        validate_filename(&filename)?;

        let data = field.bytes().await?;
        return Ok((filename, data));
    }

    Err(ValidationError::MissingFile.into())
}

async fn normalize(state: &AppState, data: Bytes) -> Result<NormalizedImage, ExtractionError> {
    let normalizer = state.normalizer;
    let image = tokio::task::spawn_blocking(move || normalizer.normalize(&data))
        .await
        .map_err(|e| ExtractionError::Internal(anyhow::Error::new(e)))??;
    Ok(image)
}
