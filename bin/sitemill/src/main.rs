//! Sitemill CLI
//!
//! Declarative static-site builds driven by remote content collections.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Sitemill.
#[derive(Parser)]
#[command(
    name = "sitemill",
    version,
    about = "Declarative static-site builds driven by remote content"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sitemill.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch content and build the site
    Build {
        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Serve the built site for local preview
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        /// Open browser automatically
        #[arg(long)]
        open: bool,
    },
    /// Validate configuration and environment
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Local .env files supply the access token during development.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    sitemill::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { output } => {
            sitemill::cmd::build::run(&cli.config, output.as_deref()).await?;
        }
        Commands::Serve { port, open } => {
            sitemill::cmd::serve::run(&cli.config, port, open).await?;
        }
        Commands::Check { strict } => {
            sitemill::cmd::check::run(&cli.config, strict)?;
        }
    }

    Ok(())
}
