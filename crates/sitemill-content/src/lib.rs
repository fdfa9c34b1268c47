//! Sitemill Content Library
//!
//! Content client implementations for the Sitemill build pipeline:
//! - [`ContentClient`]: the async fetch trait the pipeline consumes
//! - [`DeliveryClient`]: Contentful-style delivery API over HTTPS
//! - [`FixtureClient`]: local JSON fixtures for offline builds and tests
//!
//! [`client_from_config`] picks the implementation the configuration asks
//! for.

pub mod client;
pub mod delivery;
pub mod fixture;
mod wire;

pub use client::{ClientError, ContentClient, Result, client_from_config};
pub use delivery::{ACCESS_TOKEN_VAR, DeliveryClient};
pub use fixture::FixtureClient;
