mod cli;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use switchres_display::platform::PlatformDisplay;
use switchres_display::{resolve_catalog, DisplayError};
use switchres_watchdog::{CancellationToken, Watchdog};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Input errors come before any display access
    let resolution = match (cli.list, cli.resolution) {
        (true, _) => None,
        (false, Some(resolution)) => Some(resolution),
        (false, None) => {
            eprintln!("Resolution not specified");
            return Ok(ExitCode::FAILURE);
        }
    };

    let display = match PlatformDisplay::open() {
        Ok(display) => Arc::new(display),
        Err(err) => {
            tracing::debug!(error = %err, "display backend could not be opened");
            eprintln!("{}", DisplayError::Unavailable);
            return Ok(ExitCode::FAILURE);
        }
    };

    let catalog = match resolve_catalog(display.as_ref()) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let Some(resolution) = resolution else {
        output::print_catalog(&catalog, cli.json)?;
        return Ok(ExitCode::SUCCESS);
    };

    let Some(requested) = catalog.select(resolution).cloned() else {
        output::print_not_found(&catalog);
        return Ok(ExitCode::FAILURE);
    };

    let policy = cli.poll_policy();
    let shutdown = CancellationToken::new();
    if policy.condition.is_watched() {
        spawn_shutdown_listener(shutdown.clone());
    }

    let mut watchdog = Watchdog::new(
        Arc::clone(&display),
        catalog.display(),
        requested,
        catalog.current().clone(),
        policy,
    );

    let outcome = watchdog
        .run(shutdown)
        .await
        .with_context(|| format!("could not switch display to {}", resolution))?;

    tracing::info!(?outcome, state = %watchdog.state(), "finished");
    Ok(ExitCode::SUCCESS)
}

/// Cancel `shutdown` on Ctrl-C (and SIGTERM on Unix).
fn spawn_shutdown_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("received shutdown signal");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to listen for SIGTERM");
            ctrl_c.await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
