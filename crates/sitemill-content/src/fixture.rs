//! Local fixture content client.
//!
//! Serves declared sources from JSON files on disk, one
//! `<fixtures_dir>/<content_type>.json` per content type. A file holds
//! either a bare array of entries or the delivery API's `{ "items": [...] }`
//! envelope, so captured API responses drop in unchanged. Useful for
//! offline builds and deterministic tests.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use sitemill_core::Entry;
use tracing::debug;

use crate::{
    client::{ClientError, ContentClient, Result},
    wire::{WireCollection, WireEntry},
};

/// Content client reading fixture files from a directory.
pub struct FixtureClient {
    dir: PathBuf,
}

/// A fixture file body: envelope or bare entry array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureDoc {
    Collection(WireCollection),
    Entries(Vec<WireEntry>),
}

impl FixtureClient {
    /// Create a client reading from the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ContentClient for FixtureClient {
    async fn fetch(&self, content_type: &str) -> Result<Vec<Entry>> {
        let path = self.dir.join(format!("{content_type}.json"));
        debug!(path = %path.display(), "reading fixture");

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| ClientError::Fixture {
                path: path.clone(),
                source,
            })?;

        let doc: FixtureDoc =
            serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
                content_type: content_type.to_string(),
                source,
            })?;

        let items = match doc {
            FixtureDoc::Collection(collection) => collection.items,
            FixtureDoc::Entries(entries) => entries,
        };

        debug!(content_type, count = items.len(), "fixture loaded");

        Ok(items
            .into_iter()
            .map(|item| item.into_entry(content_type))
            .collect())
    }
}
