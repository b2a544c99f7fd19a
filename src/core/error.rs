//! Error types for lunalight

use thiserror::Error;

use crate::illumination::IlluminationError;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Invalid observer location: latitude {latitude}, longitude {longitude}")]
    InvalidObserver { latitude: f64, longitude: f64 },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid value for {flag}: {value:?}")]
    InvalidArgument { flag: String, value: Option<String> },

    #[error("Illumination error: {0}")]
    Illumination(#[from] IlluminationError),
}
