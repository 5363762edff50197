use std::fmt;

use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{DalleError, Result};
use crate::types::{ImageData, ImageRequest, ImageResponse, Opts};

/// Default image generation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

/// User agent sent with generation requests
///
/// The API fronting rejects some default client user agents.
pub const USER_AGENT: &str = "curl/7.79.1";

/// Typed client for the image generation API
///
/// Holds the credential, the endpoint and the default [`Opts`] applied to
/// every [`DalleClient::generate`] call. Cloning is cheap and clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct DalleClient {
    endpoint: Url,
    api_key: SecretString,
    opts: Opts,
    http: reqwest::Client,
}

impl fmt::Debug for DalleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DalleClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl DalleClient {
    /// Create a client with empty default options
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_opts(api_key, Opts::default())
    }

    /// Create a client with the given default options
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty
    pub fn with_opts(api_key: impl Into<String>, opts: Opts) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(DalleError::Config("API key must not be empty".to_owned()));
        }

        Ok(Self {
            endpoint: default_endpoint(),
            api_key: SecretString::from(api_key),
            opts,
            http: reqwest::Client::new(),
        })
    }

    /// Point the client at another endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.set_endpoint(endpoint)?;
        Ok(self)
    }

    /// Use a preconfigured HTTP client for every request
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Generation endpoint in use
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Replace the generation endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        self.endpoint = Url::parse(endpoint)
            .map_err(|e| DalleError::Config(format!("invalid endpoint URL: {e}")))?;
        Ok(())
    }

    /// Default options applied to each request
    pub const fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Mutable access to the default options
    pub const fn opts_mut(&mut self) -> &mut Opts {
        &mut self.opts
    }

    // -- Generation --

    /// Generate images for a prompt using the default options
    ///
    /// # Errors
    ///
    /// Returns [`DalleError::Http`] if the endpoint is unreachable,
    /// [`DalleError::Parse`] if the body is not a valid response and
    /// [`DalleError::Api`] if the API returned an error object
    pub async fn generate(&self, prompt: &str) -> Result<ImageResponse> {
        self.generate_with(prompt, &self.opts).await
    }

    /// Generate images for a prompt with one-off options
    ///
    /// The client's default options are left untouched.
    pub async fn generate_with(&self, prompt: &str, opts: &Opts) -> Result<ImageResponse> {
        let request = ImageRequest::new(prompt, opts);

        tracing::debug!(endpoint = %self.endpoint, ?opts, "sending image generation request");

        let response = self
            .http
            .post(self.endpoint.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret()))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint = %self.endpoint, error = %e, "image generation request failed");
                DalleError::Http(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        let mut response = parse_response(&body).inspect_err(|e| {
            tracing::error!(status = %status, error = %e, "failed to parse image generation response");
        })?;

        if let Some(detail) = response.error.take() {
            tracing::debug!(status = %status, code = %detail.code, "image generation rejected");
            return Err(DalleError::Api(detail));
        }

        tracing::debug!(count = response.data.len(), "image generation complete");

        Ok(response)
    }

    /// Materialize an entry through this client's HTTP connection pool
    pub async fn materialize(&self, data: &ImageData) -> Result<Bytes> {
        data.materialize_with(&self.http).await
    }
}

// -- Helper functions --

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("valid default endpoint")
}

/// Decode a generation response body
fn parse_response(body: &str) -> Result<ImageResponse> {
    serde_json::from_str(body).map_err(|e| DalleError::Parse(e.to_string()))
}
