use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use exif_banner::config::Config;
use exif_banner::pipeline::{self, CancellationToken, UsageError};

#[derive(Parser, Debug)]
#[command(
    name = "exif-banner",
    version,
    about = "Stamp photos with a copyright/camera/location banner and rewrite their copyright EXIF. \
             Each input is replaced by a .jpg next to it."
)]
struct Cli {
    /// Image files to process, in order
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    if cli.files.is_empty() {
        eprintln!("error: {UsageError}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::default();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, stopping after the current file");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    match pipeline::run(&cli.files, &config, &cancel).await {
        Ok(summary) if summary.cancelled => ExitCode::FAILURE,
        // Files skipped under continue_on_error were already logged.
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
