#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Typed Rust client for the `OpenAI` image generation API
//!
//! Sends a prompt to `/v1/images/generations` and materializes the returned
//! entries into raw image bytes, either by fetching their URL or by decoding
//! their inline base64 payload.

#[cfg(feature = "blocking")]
pub mod blocking;
mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_ENDPOINT, DalleClient, USER_AGENT};
pub use error::{ApiErrorDetail, DalleError, Result};
pub use types::*;
