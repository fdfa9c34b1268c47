//! Content acquisition.
//!
//! Builds the per-run data map: one fetch per declared source, all in
//! flight at once on the calling task. Acquisition is a hard barrier; every
//! fetch settles before the result is returned, so a failure never leaves a
//! sibling request dangling. On multiple failures, the first in declaration
//! order is the one reported.

use std::collections::HashSet;

use futures::future;
use sitemill_content::{ClientError, ContentClient};
use sitemill_core::{DataMap, Entry, Source};
use thiserror::Error;
use tracing::{debug, info};

/// Result type alias using `AcquireError`.
pub type Result<T> = std::result::Result<T, AcquireError>;

/// Acquisition errors.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The same source name was declared more than once. Checked before any
    /// fetch starts.
    #[error("Duplicate source name '{0}'")]
    DuplicateSource(String),

    /// A source fetch failed.
    #[error("Fetch for source '{name}' failed: {source}")]
    Fetch {
        name: String,
        #[source]
        source: ClientError,
    },
}

/// Fetch every declared source into a data map.
pub async fn acquire(sources: &[Source], client: &dyn ContentClient) -> Result<DataMap> {
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.name.as_str()) {
            return Err(AcquireError::DuplicateSource(source.name.clone()));
        }
    }

    info!(count = sources.len(), "acquiring content");

    let fetches = sources.iter().map(|source| async move {
        debug!(name = %source.name, content_type = %source.content_type, "fetching source");
        let entries = client
            .fetch(&source.content_type)
            .await
            .map_err(|err| AcquireError::Fetch {
                name: source.name.clone(),
                source: err,
            })?;
        debug!(name = %source.name, entries = entries.len(), "source fetched");
        Ok::<(String, Vec<Entry>), AcquireError>((source.name.clone(), entries))
    });

    // join_all lets every fetch settle; errors surface afterwards in
    // declaration order.
    let results = future::join_all(fetches).await;

    let mut pairs = Vec::with_capacity(results.len());
    for result in results {
        pairs.push(result?);
    }

    Ok(DataMap::from_entries(pairs))
}
