//! Wire format of the content delivery API.
//!
//! Matches the collection and entry JSON served by Contentful-style
//! delivery endpoints. Fixture files reuse the same shapes, so both clients
//! decode through this module.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use sitemill_core::Entry;

/// Collection envelope: `{ "items": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireCollection {
    #[serde(default)]
    pub items: Vec<WireEntry>,
}

/// One delivered entry.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEntry {
    pub sys: WireSys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Entry system metadata.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSys {
    pub id: String,
    #[serde(rename = "contentType", default)]
    pub content_type: Option<WireLink>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A link to another resource, reduced to its id.
#[derive(Debug, Deserialize)]
pub(crate) struct WireLink {
    pub sys: WireLinkSys,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLinkSys {
    pub id: String,
}

impl WireEntry {
    /// Convert into the pipeline's entry model. Entries without an explicit
    /// content type link take the type they were requested under.
    pub fn into_entry(self, requested_content_type: &str) -> Entry {
        let content_type = self
            .sys
            .content_type
            .map(|link| link.sys.id)
            .unwrap_or_else(|| requested_content_type.to_string());

        Entry {
            id: self.sys.id,
            content_type,
            fields: self.fields,
            created_at: self.sys.created_at,
            updated_at: self.sys.updated_at,
        }
    }
}
