use serde::Serialize;

pub const SUCCESS_MESSAGE: &str = "Image processed successfully";

/// Body of a successful extraction. `response` is the model output verbatim.
#[derive(Debug, Serialize)]
pub struct ExtractionResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub response: String,
}

impl ExtractionResponse {
    pub fn success(response: String) -> Self {
        Self {
            status: "success",
            message: SUCCESS_MESSAGE,
            response,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}
