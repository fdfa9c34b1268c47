//! HTTP content delivery client.
//!
//! Speaks the Contentful-style content delivery API: one GET per content
//! type against `/spaces/{space}/environments/{environment}/entries`,
//! bearer-token authenticated. No caching and no retries; a request timeout
//! is the only transport policy applied here.

use std::time::Duration;

use async_trait::async_trait;
use sitemill_core::{ContentConfig, Entry};
use tracing::debug;

use crate::{
    client::{ClientError, ContentClient, Result},
    wire::WireCollection,
};

/// Environment variable holding the delivery API access token. Tokens are
/// never read from the configuration file.
pub const ACCESS_TOKEN_VAR: &str = "SITEMILL_ACCESS_TOKEN";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a remote content delivery API.
#[derive(Debug)]
pub struct DeliveryClient {
    http: reqwest::Client,
    api_url: String,
    space: String,
    environment: String,
    token: String,
}

impl DeliveryClient {
    /// Create a client for one space and environment.
    pub fn new(
        api_url: impl Into<String>,
        space: impl Into<String>,
        environment: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let api_url = api_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            api_url,
            space: space.into(),
            environment: environment.into(),
            token: token.into(),
        })
    }

    /// Build a client from the content section of the configuration. The
    /// access token comes from [`ACCESS_TOKEN_VAR`].
    pub fn from_config(content: &ContentConfig) -> Result<Self> {
        let space = content
            .space
            .clone()
            .ok_or_else(|| ClientError::MissingCredentials("content.space".to_string()))?;
        let token = std::env::var(ACCESS_TOKEN_VAR)
            .map_err(|_| ClientError::MissingCredentials(ACCESS_TOKEN_VAR.to_string()))?;

        Self::new(&content.api_url, space, &content.environment, token)
    }

    /// Entries endpoint for this space and environment.
    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.api_url, self.space, self.environment
        )
    }
}

#[async_trait]
impl ContentClient for DeliveryClient {
    async fn fetch(&self, content_type: &str) -> Result<Vec<Entry>> {
        debug!(content_type, "fetching entries");

        let response = self
            .http
            .get(self.entries_url())
            .bearer_auth(&self.token)
            .query(&[("content_type", content_type)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let collection: WireCollection =
            serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
                content_type: content_type.to_string(),
                source,
            })?;

        debug!(content_type, count = collection.items.len(), "fetched entries");

        Ok(collection
            .items
            .into_iter()
            .map(|item| item.into_entry(content_type))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_url() {
        let client =
            DeliveryClient::new("https://cdn.contentful.com", "space1", "master", "tok").unwrap();
        assert_eq!(
            client.entries_url(),
            "https://cdn.contentful.com/spaces/space1/environments/master/entries"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            DeliveryClient::new("https://cdn.contentful.com/", "space1", "master", "tok").unwrap();
        assert_eq!(
            client.entries_url(),
            "https://cdn.contentful.com/spaces/space1/environments/master/entries"
        );
    }

    #[test]
    fn test_from_config_requires_space() {
        let content = ContentConfig::default();
        let err = DeliveryClient::from_config(&content).unwrap_err();
        assert!(matches!(err, ClientError::MissingCredentials(_)));
    }
}
