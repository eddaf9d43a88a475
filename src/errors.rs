// ABOUTME: Error types for the carousel-slides application
// ABOUTME: Provides structured error handling for generation, rendering and export

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarouselError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to reach remote service: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Completion service returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Empty response from the completion service")]
    EmptyResponse,

    #[error("Completion service did not return valid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid response format: {0}")]
    InvalidShape(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Element not found: #{0}")]
    ElementNotFound(String),

    #[error("Failed to capture screenshot: {0}")]
    ScreenshotError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl From<anyhow::Error> for CarouselError {
    fn from(err: anyhow::Error) -> Self {
        CarouselError::UnknownError(err.to_string())
    }
}

impl From<zip::result::ZipError> for CarouselError {
    fn from(err: zip::result::ZipError) -> Self {
        CarouselError::ExportError(format!("ZIP operation failed: {}", err))
    }
}

impl CarouselError {
    /// Wrap a headless_chrome failure with context, keeping it as the source.
    pub fn browser(context: &str, err: anyhow::Error) -> Self {
        CarouselError::BrowserError {
            message: format!("{}: {}", context, err),
            source: Some(err.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CarouselError>;
