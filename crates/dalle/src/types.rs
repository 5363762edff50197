use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::error::{ApiErrorDetail, DalleError, Result};

// -- Generation options --

/// Size of generated images
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum ImageSize {
    /// 256x256 pixels
    #[serde(rename = "256x256")]
    #[strum(serialize = "256x256")]
    Square256,
    /// 512x512 pixels
    #[serde(rename = "512x512")]
    #[strum(serialize = "512x512")]
    Square512,
    /// 1024x1024 pixels
    #[serde(rename = "1024x1024")]
    #[strum(serialize = "1024x1024")]
    Square1024,
}

/// How the API returns generated images
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseFormat {
    /// A URL to the hosted image
    Url,
    /// The image inline as base64
    B64Json,
}

/// Optional generation parameters
///
/// Unset fields are left out of the request body entirely, so the API applies
/// its own defaults. `count: Some(0)` is sent as `"n": 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Opts {
    /// Number of images to generate
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Size of generated images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    /// Response format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// End-user identifier forwarded to the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Opts {
    /// Set the number of images
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the image size
    #[must_use]
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the response format
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Set the end-user identifier
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

// -- Wire types --

/// Image generation request body
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImageRequest<'a> {
    /// Text description of the desired image
    pub prompt: &'a str,
    /// Generation options, flattened into the body
    #[serde(flatten)]
    pub opts: &'a Opts,
}

impl<'a> ImageRequest<'a> {
    pub const fn new(prompt: &'a str, opts: &'a Opts) -> Self {
        Self { prompt, opts }
    }
}

/// Image generation response
///
/// Missing or `null` members decode to their defaults so an error object is
/// never masked by the rest of the body.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageResponse {
    /// Unix timestamp
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub created: u64,
    /// Generated image entries
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub data: Vec<ImageData>,
    /// Error object, present when the API rejected the request
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

/// Single generated image
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageData {
    /// URL of the generated image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Base64-encoded image data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

impl ImageData {
    /// Turn this entry into raw image bytes
    ///
    /// Fetches `url` when set, otherwise decodes `b64_json`. An entry with
    /// neither yields empty bytes. Nothing is cached between calls.
    pub async fn materialize(&self) -> Result<Bytes> {
        self.materialize_with(&reqwest::Client::new()).await
    }

    /// Same as [`ImageData::materialize`], fetching through `http`
    pub async fn materialize_with(&self, http: &reqwest::Client) -> Result<Bytes> {
        if let Some(url) = self.url.as_deref().filter(|url| !url.is_empty()) {
            tracing::debug!(url, "fetching generated image");
            return fetch(http, url).await;
        }

        if let Some(encoded) = self.b64_json.as_deref().filter(|data| !data.is_empty()) {
            tracing::debug!(len = encoded.len(), "decoding inline image");
            return Ok(Bytes::from(STANDARD.decode(encoded)?));
        }

        Ok(Bytes::new())
    }
}

/// GET an image URL, surfacing the body verbatim on failure
async fn fetch(http: &reqwest::Client, url: &str) -> Result<Bytes> {
    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        return Ok(body);
    }

    tracing::error!(url, status = %status, "image fetch failed");

    Err(DalleError::Fetch {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
