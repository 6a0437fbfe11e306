use anyhow::Result;
use clap::Parser;
use color_eyre::config::HookBuilder;
use std::path::PathBuf;

mod handlers;

/// galsync - upload a gallery build to S3
#[derive(Parser, Debug)]
#[command(name = "galsync")]
#[command(version = "0.1.0")]
#[command(
    about = "Upload a static gallery's build output to an S3 bucket, skipping files already there",
    long_about = None
)]
struct Cli {
    /// Build output directory to upload (the generator's destination)
    destination: PathBuf,

    /// Path to the gallery settings file holding the [upload_s3] table
    #[arg(short, long, default_value = "gallery.toml", env = "GALSYNC_SETTINGS")]
    settings: PathBuf,

    /// Re-upload every file regardless of remote state
    #[arg(long)]
    overwrite: bool,

    /// Keep uploading past a failed file instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Custom S3-compatible endpoint URL
    #[arg(long, env = "GALSYNC_ENDPOINT")]
    endpoint: Option<String>,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galsync=info,galsync_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    handlers::handle_sync(
        &cli.destination,
        &cli.settings,
        cli.overwrite,
        cli.keep_going,
        cli.endpoint,
        cli.quiet,
    )
    .await
}
