//! Content client trait and shared error type.

use std::path::PathBuf;

use async_trait::async_trait;
use sitemill_core::{ContentConfig, ContentProvider, Entry};
use thiserror::Error;

use crate::{delivery::DeliveryClient, fixture::FixtureClient};

/// Result type alias using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Content client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A credential or setting the client needs was missing.
    #[error("Missing content client credential: {0}")]
    MissingCredentials(String),

    /// Transport-level HTTP failure.
    #[error("Content API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Content API error {status}: {body}")]
    Api { status: u16, body: String },

    /// A response body could not be decoded.
    #[error("Failed to decode entries for content type '{content_type}': {source}")]
    Decode {
        content_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A fixture file was missing or unreadable.
    #[error("Fixture error for {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Asynchronous source of content collections.
///
/// One implementation per backing service. The pipeline calls [`fetch`]
/// exactly once per declared source and treats any error as fatal for the
/// whole acquisition.
///
/// [`fetch`]: ContentClient::fetch
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetch every entry of one content type, in the order the backing
    /// service returns them.
    async fn fetch(&self, content_type: &str) -> Result<Vec<Entry>>;
}

impl std::fmt::Debug for dyn ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ContentClient")
    }
}

/// Construct the content client the configuration asks for.
pub fn client_from_config(content: &ContentConfig) -> Result<Box<dyn ContentClient>> {
    match content.provider {
        ContentProvider::Delivery => Ok(Box::new(DeliveryClient::from_config(content)?)),
        ContentProvider::Fixtures => Ok(Box::new(FixtureClient::new(&content.fixtures_dir))),
    }
}
