use crate::dtos::ErrorResponse;
use crate::services::normalizer::{NormalizeError, ValidationError};
use crate::services::ProviderError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Everything that can go wrong while serving `POST /fireworks`.
///
/// Client mistakes are reported back verbatim. Decode and provider failures
/// get a fixed message; the detail only goes to the log.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to read multipart body: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("Unable to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<NormalizeError> for ExtractionError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Decode(e) => ExtractionError::Decode(e),
            NormalizeError::Encode(e) => ExtractionError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl ExtractionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExtractionError::Validation(_) => StatusCode::BAD_REQUEST,
            ExtractionError::Multipart(e) => e.status(),
            ExtractionError::NotMultipart(e) => e.status(),
            ExtractionError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ExtractionError::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            ExtractionError::Provider(_) => StatusCode::BAD_GATEWAY,
            ExtractionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for `extraction_requests_total`.
    pub fn outcome(&self) -> &'static str {
        match self {
            ExtractionError::Validation(_)
            | ExtractionError::Multipart(_)
            | ExtractionError::NotMultipart(_) => "validation",
            ExtractionError::Decode(_) => "decode",
            ExtractionError::Provider(e) => e.kind(),
            ExtractionError::Internal(_) => "internal",
        }
    }

    fn public_message(&self) -> String {
        match self {
            ExtractionError::Validation(e) => e.to_string(),
            ExtractionError::Multipart(e) => {
                format!("Failed to read multipart body: {}", e.body_text())
            }
            ExtractionError::NotMultipart(e) => {
                format!("Failed to read multipart body: {}", e.body_text())
            }
            ExtractionError::Decode(_) => "Unable to decode image".to_string(),
            ExtractionError::Provider(ProviderError::RateLimited) => {
                "Inference provider rate limited, try again later".to_string()
            }
            ExtractionError::Provider(_) => "Inference provider error".to_string(),
            ExtractionError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Extraction failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Extraction rejected");
        }

        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}
