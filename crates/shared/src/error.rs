use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local rejections raised before anything is sent to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a valid image file (PNG, JPG, JPEG, GIF, or BMP).")]
    UnsupportedMediaType { declared: String },
    #[error("File size must be less than 16MB. Please choose a smaller image.")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown detail tab '{name}'")]
pub struct UnknownTab {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    PayloadTooLarge,
    Internal,
}

/// Error body written by the fixture server. Serialized as `{"error": ..., "code": ...}`
/// so it reads as a rejected prediction on the client side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "error")]
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
