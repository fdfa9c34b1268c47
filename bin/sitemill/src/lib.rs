//! Sitemill CLI Library
//!
//! This library provides the functionality behind the Sitemill CLI. It is
//! used by the binary entry point while also exposing public APIs for
//! documentation and integration purposes.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, serve, check)
//! - [`server`] - Static preview server for built output
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sitemill::cmd;
//!
//! # async fn run() -> color_eyre::eyre::Result<()> {
//! // Fetch content and build the site
//! cmd::build::run(Path::new("sitemill.toml"), None).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod server;

// Re-export pipeline types for convenience
pub use sitemill_build::{BuildReport, Builder, TeraRenderer};
pub use sitemill_core::Config;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// sitemill::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
