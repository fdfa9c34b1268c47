//! Sitemill Core Library
//!
//! Core functionality for the Sitemill build pipeline:
//! - Content model: sources, entries and the per-run data map
//! - Target model: concrete targets, generators and target specs
//! - Configuration loading, validation and target-rule compilation
//! - Destination pattern interpolation
//!
//! The engine that drives these types lives in `sitemill-build`; content
//! clients live in `sitemill-content`.

pub mod config;
pub mod error;
pub mod model;
pub mod pattern;

pub use config::{BuildConfig, Config, ContentConfig, ContentProvider, TargetRule};
pub use error::{CoreError, Result};
pub use model::{
    CopyTarget, DataMap, Entry, GeneratorError, RenderTarget, Source, Target, TargetGenerator,
    TargetNode, TargetSpec,
};
