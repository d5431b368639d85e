//! Metcalf - run a matrix of build jobs with bounded concurrency

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{output, Cli, ConfigFailure};

fn main() {
    let guard = init_tracing();

    let cli = Cli::parse();
    let code = match cli.execute() {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => report_error(&err),
    };

    // process::exit skips destructors; flush the file log first
    drop(guard);
    std::process::exit(code);
}

/// Print a fatal error and pick the exit code for it
fn report_error(err: &anyhow::Error) -> i32 {
    tracing::error!(error = %format!("{:#}", err), "metcalf failed");

    match err.downcast_ref::<ConfigFailure>() {
        Some(failure) => {
            output::error(&failure.message());
            exit_codes::CONFIG_ERROR
        }
        None => {
            output::error(&format!("{:#}", err));
            exit_codes::ERROR
        }
    }
}

/// Set up tracing with two layers:
/// - Console: controlled by RUST_LOG (default: warn)
/// - File: always debug-level JSON to ~/.metcalf/logs/
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "metcalf.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".metcalf").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
