mod backend;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so command output on stdout stays scriptable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.store_config()?;
    let store = backend::open_store(&config, cli.pool_size)?;

    info!("Starting latchctl");
    info!("  Backend: {}", store.backend());
    info!("  Default TTL: {:?}", config.default_ttl);

    store.connect().await?;

    let run = commands::run(&cli.command, store.clone(), &config);
    let outcome = if cli.command.handles_interrupt() {
        Some(run.await)
    } else {
        tokio::select! {
            result = run => Some(result),
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, aborting command");
                None
            }
        }
    };

    if let Err(e) = store.disconnect().await {
        warn!("Disconnect failed: {}", e);
    }

    match outcome {
        Some(Ok(message)) => {
            println!("{}", message);
            Ok(ExitCode::SUCCESS)
        }
        Some(Err(e)) => {
            error!(code = e.code(), "{}", e);
            eprintln!("{}: {}", e.code(), e);
            // Contention is an expected answer, distinguish it from failures
            Ok(ExitCode::from(if e.is_contention() { 2 } else { 1 }))
        }
        None => Ok(ExitCode::from(130)),
    }
}
