use thiserror::Error;

use crate::session::repo::StoreError;

/// The only message a caller ever shows for a failed generation.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate styling advice. Please try again.";

/// Errors from the remote styling model.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("no response from model")]
    EmptyResponse,

    #[error("malformed model response: {0}")]
    Malformed(String),
}

impl GenerationError {
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

/// Input problems caught before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a photo first.")]
    MissingImage,

    #[error("The uploaded photo could not be read.")]
    InvalidImage,

    #[error("File size too large. Please upload an image under 5MB.")]
    ImageTooLarge { bytes: usize },

    #[error("Please enter your age.")]
    MissingAge,
}

#[derive(Debug, Error)]
pub enum StylingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Gemini error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_generation_error_has_the_same_user_message() {
        let errs = [
            GenerationError::MissingApiKey,
            GenerationError::EmptyResponse,
            GenerationError::Malformed("x".into()),
            GenerationError::Status {
                status: 500,
                message: "boom".into(),
            },
        ];
        for e in errs {
            assert_eq!(e.user_message(), GENERATION_FAILED_MESSAGE);
        }
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            ValidationError::ImageTooLarge { bytes: 6 }.to_string(),
            "File size too large. Please upload an image under 5MB."
        );
        assert_eq!(ValidationError::MissingAge.to_string(), "Please enter your age.");
    }

    #[test]
    fn api_error_deserialization() {
        let json = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.code, 400);
        assert_eq!(parsed.error.status, "INVALID_ARGUMENT");
        assert_eq!(parsed.error.message, "API key not valid");
    }
}
