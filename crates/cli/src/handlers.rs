//! Command handler for the sync run

use anyhow::Result;
use console::style;
use galsync_core::{Error, FailurePolicy, S3Store, SyncRunner, UploadOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::warn;

pub async fn handle_sync(
    destination: &Path,
    settings: &Path,
    overwrite: bool,
    keep_going: bool,
    endpoint: Option<String>,
    quiet: bool,
) -> Result<()> {
    let mut options = match UploadOptions::from_settings_file(settings) {
        Ok(options) => options,
        Err(Error::ConfigMissing) => {
            // Absent namespace disables the uploader without failing the build
            warn!("Upload to S3 is not configured, skipping");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if overwrite {
        options.overwrite = true;
    }
    if keep_going {
        options.on_error = FailurePolicy::Continue;
    }

    println!(
        "Uploading {} to bucket {} (policy: {})...",
        destination.display(),
        style(&options.bucket).cyan(),
        options.policy
    );

    let store = S3Store::from_env(options.bucket.clone(), endpoint).await;
    let mut runner = SyncRunner::new(&store, destination, options);

    let mut bar = None;
    if !quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("#>-"),
        );
        // The first callback carries the work-list total, before any upload
        let cb = pb.clone();
        runner = runner.with_progress(Box::new(move |done, total, key| {
            if cb.length() != Some(total as u64) {
                cb.set_length(total as u64);
            }
            cb.set_position(done as u64);
            if !key.is_empty() {
                cb.set_message(key.to_string());
            }
            if done == total {
                cb.finish_and_clear();
            }
        }));
        bar = Some(pb);
    }

    let result = runner.run().await;
    if let Some(pb) = bar {
        if !pb.is_finished() {
            pb.abandon();
        }
    }
    let report = result?;

    println!(
        "  {} {} uploaded, {} skipped",
        style("✅").green(),
        report.uploaded,
        report.skipped
    );

    if !report.failed.is_empty() {
        for (key, message) in &report.failed {
            eprintln!("  {} {}: {}", style("✗").red(), key, message);
        }
        return Err(anyhow::anyhow!(
            "{} file(s) failed to upload",
            report.failed.len()
        ));
    }

    Ok(())
}
