//! Serve command - preview the built site locally

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use sitemill_core::Config;
use tokio::net::TcpListener;

use crate::server::create_router;

/// Run the serve command.
///
/// Serves the configured output directory over HTTP until interrupted.
pub async fn run(config_path: &Path, port: u16, open_browser: bool) -> Result<()> {
    let config = Config::load(config_path).wrap_err("Failed to load configuration")?;
    let output_dir = Path::new(&config.build.output_dir);

    if !output_dir.is_dir() {
        bail!(
            "Output directory '{}' does not exist; run `sitemill build` first",
            output_dir.display()
        );
    }

    let app = create_router(output_dir);
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    let url = format!("http://{addr}");
    println!();
    println!("  Serving {} at {url}", output_dir.display());
    println!("  Press Ctrl+C to stop");
    println!();

    if open_browser {
        if let Err(err) = open::that(&url) {
            tracing::warn!(%err, "Failed to open browser");
        }
    }

    axum::serve(listener, app).await.wrap_err("Server error")?;

    Ok(())
}
