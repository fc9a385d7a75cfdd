//! Tour de Data - builds the cycling statistics snapshots.
//!
//! Each snapshot command prints one JSON document to stdout. Logs go to
//! stderr (and optionally a file) so the output can be redirected as is.

mod cli;
mod commands;
mod output;

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tourdedata_core::{AssemblyReport, Cache, Config, CountryTable, Enricher, PcsClient, SnapshotAssembler};

use cli::{Cli, Commands};

/// Exit status when the snapshot was written but some listings are missing
const EXIT_INCOMPLETE: u8 = 2;

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug). The returned
/// guard must live until exit so the file writer is flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.cache_dir.is_some() {
        config.cache_dir = cli.cache_dir;
    }
    if cli.backup.is_some() {
        config.backup = cli.backup;
    }
    config.fail_fast |= cli.fail_fast;

    let cache = Cache::open(config.cache_dir()?)?;

    if let Commands::Cache(ref command) = cli.command {
        for line in commands::run_cache(&cache, command)? {
            println!("{}", line);
        }
        cache.close()?;
        return Ok(ExitCode::SUCCESS);
    }

    info!(base_url = %config.base_url, "Tour de Data starting");
    let client = PcsClient::with_base_url(&config.base_url, Duration::from_secs(config.request_timeout_secs))?;
    let mut report = AssemblyReport::new();

    let snapshot = {
        let enricher = Enricher::new(&client, CountryTable::builtin(), &cache);
        let assembler = SnapshotAssembler::new(enricher).fail_fast(config.fail_fast);
        commands::build_snapshot(&assembler, &cli.command, &config, &mut report).await
    };
    // Entries written so far are kept even when the run aborts
    cache.close()?;

    output::emit(&snapshot?, config.backup.as_deref())?;
    report.log_summary();

    if report.has_failures() {
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
