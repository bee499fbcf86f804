// SPDX-License-Identifier: MIT

//! Error types for daylog

use thiserror::Error;

/// Result type alias for daylog operations
pub type Result<T> = std::result::Result<T, DaylogError>;

/// daylog error types
#[derive(Error, Debug)]
pub enum DaylogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Model runtime not available: {0}")]
    RuntimeUnavailable(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
