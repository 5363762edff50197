use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Client-specific result type
pub type Result<T> = std::result::Result<T, DalleError>;

/// Errors from the image generation client
#[derive(Debug, thiserror::Error)]
pub enum DalleError {
    /// Invalid configuration (empty API key, malformed endpoint)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// HTTP transport error reaching either endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The generation endpoint returned an error object
    #[error("API error: {0}")]
    Api(ApiErrorDetail),

    /// Failed to parse the generation response
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Image URL fetch returned a non-success status
    ///
    /// Displays as the raw body text the image server returned.
    #[error("{body}")]
    Fetch {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// Inline base64 payload could not be decoded
    #[error("failed to decode base64 image: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The blocking client could not start its runtime
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),
}

/// Error object returned by the image generation API
///
/// `null` members decode to empty strings, the API sends `null` for
/// `code` and `param` on most errors.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub code: String,
    /// Human-readable error message
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub message: String,
    /// Request parameter the error refers to
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub param: String,
    /// Error type identifier
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default, rename = "type")]
    pub error_type: String,
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
