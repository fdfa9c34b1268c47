//! Static preview server for built output.
//!
//! A plain passthrough over the output directory: every file is served
//! exactly as built, dotfiles included. No watching, no rebuilding, no
//! reload; rerun `sitemill build` and refresh.

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

/// Create the preview server router for the output directory.
pub fn create_router(output_dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(output_dir))
}
