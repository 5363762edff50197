//! Synchronous facade over [`crate::DalleClient`]
//!
//! Each call drives the async client to completion on a private
//! current-thread runtime. Do not call these from inside an async runtime.

use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::error::{DalleError, Result};
use crate::types::{ImageData, ImageResponse, Opts};

/// Blocking image generation client
#[derive(Debug)]
pub struct DalleClient {
    inner: crate::DalleClient,
    runtime: Runtime,
}

impl DalleClient {
    /// Create a client with empty default options
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the runtime cannot start
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::wrap(crate::DalleClient::new(api_key)?)
    }

    /// Create a client with the given default options
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the runtime cannot start
    pub fn with_opts(api_key: impl Into<String>, opts: Opts) -> Result<Self> {
        Self::wrap(crate::DalleClient::with_opts(api_key, opts)?)
    }

    /// Wrap an existing async client
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot start
    pub fn wrap(inner: crate::DalleClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DalleError::Runtime)?;

        Ok(Self { inner, runtime })
    }

    /// Generation endpoint in use
    pub const fn endpoint(&self) -> &Url {
        self.inner.endpoint()
    }

    /// Replace the generation endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        self.inner.set_endpoint(endpoint)
    }

    /// Default options applied to each request
    pub const fn opts(&self) -> &Opts {
        self.inner.opts()
    }

    /// Mutable access to the default options
    pub const fn opts_mut(&mut self) -> &mut Opts {
        self.inner.opts_mut()
    }

    /// Generate images for a prompt using the default options
    ///
    /// # Errors
    ///
    /// Same as [`crate::DalleClient::generate`]
    pub fn generate(&self, prompt: &str) -> Result<ImageResponse> {
        self.runtime.block_on(self.inner.generate(prompt))
    }

    /// Generate images for a prompt with one-off options
    ///
    /// # Errors
    ///
    /// Same as [`crate::DalleClient::generate_with`]
    pub fn generate_with(&self, prompt: &str, opts: &Opts) -> Result<ImageResponse> {
        self.runtime.block_on(self.inner.generate_with(prompt, opts))
    }

    /// Turn an entry into raw image bytes
    ///
    /// # Errors
    ///
    /// Same as [`ImageData::materialize`]
    pub fn materialize(&self, data: &ImageData) -> Result<Bytes> {
        self.runtime.block_on(self.inner.materialize(data))
    }
}
