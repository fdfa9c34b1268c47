//! Check command - validate configuration and environment

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use sitemill_content::ACCESS_TOKEN_VAR;
use sitemill_core::{Config, ContentProvider};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration, the content provider setup and the local
/// directories a build would touch, without fetching or writing anything.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration");

    let mut result = ValidationResult::default();

    // Validate configuration
    println!("Checking configuration...");
    let config = match Config::load(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking content provider...");
        check_provider(cfg, &mut result);

        println!("\nChecking directories...");
        check_directories(cfg, &mut result);
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    // Determine exit status
    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check the content provider has what it needs to fetch.
fn check_provider(config: &Config, result: &mut ValidationResult) {
    match config.content.provider {
        ContentProvider::Delivery => {
            if config.content.space.is_some() {
                println!("  ✓ content.space set");
            } else {
                result.add_error("content.space is required for the delivery provider");
                println!("  ✗ content.space missing");
            }

            if std::env::var(ACCESS_TOKEN_VAR).is_ok() {
                println!("  ✓ {ACCESS_TOKEN_VAR} set");
            } else {
                result.add_warning(format!(
                    "{ACCESS_TOKEN_VAR} is not set; builds will fail to authenticate"
                ));
                println!("  ⚠ {ACCESS_TOKEN_VAR} not set");
            }
        }
        ContentProvider::Fixtures => {
            let dir = Path::new(&config.content.fixtures_dir);
            if dir.is_dir() {
                println!("  ✓ fixtures directory exists");
                for source in &config.sources {
                    let file = dir.join(format!("{}.json", source.content_type));
                    if !file.is_file() {
                        result.add_warning(format!(
                            "Fixture file missing for source '{}': {}",
                            source.name,
                            file.display()
                        ));
                        println!("  ⚠ missing fixture {}", file.display());
                    }
                }
            } else {
                result.add_error(format!(
                    "Fixtures directory does not exist: {}",
                    dir.display()
                ));
                println!("  ✗ fixtures directory missing");
            }
        }
    }
}

/// Check the local directories a build reads and writes.
fn check_directories(config: &Config, result: &mut ValidationResult) {
    let templates = Path::new(&config.build.templates_dir);
    if templates.is_dir() {
        println!("  ✓ templates directory exists");
    } else {
        result.add_warning(format!(
            "Templates directory does not exist: {} (render targets will fail)",
            templates.display()
        ));
        println!("  ⚠ templates directory missing");
    }

    let output = Path::new(&config.build.output_dir);
    if output.exists() && !output.is_dir() {
        result.add_error(format!(
            "Output path exists but is not a directory: {}",
            config.build.output_dir
        ));
        println!("  ✗ output path is not a directory");
    } else {
        println!("  ✓ output path ok");
    }
}
