//! Build command - fetch content and write the site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr, bail};
use sitemill_build::{Builder, TeraRenderer};
use sitemill_content::client_from_config;
use sitemill_core::Config;

/// Run the build command.
///
/// Loads the configuration, fetches all declared sources and writes every
/// target to the output directory.
pub async fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, "Starting build");

    // Load configuration
    let mut config = Config::load(config_path).wrap_err("Failed to load configuration")?;

    // Override output directory if specified, moving the target dests with it
    if let Some(dir) = output {
        config.retarget_output(dir.to_string_lossy().to_string());
    }

    tracing::debug!(?config, "Loaded configuration");

    let output_dir = config.build.output_dir.clone();

    // Wire up the collaborators the configuration asks for
    let client =
        client_from_config(&config.content).wrap_err("Failed to create content client")?;
    let renderer = TeraRenderer::from_dir(Path::new(&config.build.templates_dir))
        .wrap_err("Failed to load templates")?;

    let report = Builder::new(config, client, Box::new(renderer))
        .build()
        .await
        .wrap_err("Build failed")?;

    let duration = start.elapsed();

    // Print build statistics
    println!();
    println!("  Targets written: {}", report.written);
    if report.collisions > 0 {
        println!("  Collisions:      {} (later target won)", report.collisions);
    }
    println!("  Duration:        {:.2}s", duration.as_secs_f64());
    println!("  Output:          {output_dir}");
    println!();

    if !report.success() {
        println!("  Failed targets:");
        for failure in &report.failures {
            println!("  ✗ {}: {}", failure.target, failure.error);
        }
        println!();
        bail!("Build finished with {} failed target(s)", report.failures.len());
    }

    println!("  Build completed successfully!");
    println!();

    tracing::info!(written = report.written, ?duration, "Build completed successfully");

    Ok(())
}
