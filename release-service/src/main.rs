//! `device-release-service` entry point.
//!
//! Without a subcommand the HTTP service runs until Ctrl+C. The `slots`,
//! `latest` and `encode-call` subcommands do one thing and exit; their JSON
//! goes to stdout and logs go to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use device_release_service::cli::{Cli, Command};
use device_release_service::config::load_env_file;
use device_release_service::{LoadedConfig, ReleaseApi, ReleaseError, http};
use device_release_slots::ReleaseAction;
use serde::Serialize;

/// Exit code of `latest` when nothing is approved.
const EXIT_NO_APPROVED_RELEASE: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_env_file().context("invalid configuration")?;
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let loaded = cli.config.load().context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(loaded).await,
        Command::Slots => {
            let slots = api(&loaded).all_slots().await?;
            print_json(&slots)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Latest => match api(&loaded).latest_release().await {
            Ok(slot) => {
                print_json(&slot)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(ReleaseError::NoApprovedRelease) => Ok(ExitCode::from(EXIT_NO_APPROVED_RELEASE)),
            Err(err) => Err(err.into()),
        },
        Command::EncodeCall { call } => {
            let action = ReleaseAction::from(call);
            let call = action.to_call()?;
            loaded
                .abi
                .check_call(&call.function, call.args.len())
                .context("call does not match the contract ABI")?;
            print_json(&action.prepare(loaded.contract)?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn api(loaded: &LoadedConfig) -> ReleaseApi {
    ReleaseApi::new(Arc::new(loaded.slot_source()))
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(loaded: LoadedConfig) -> anyhow::Result<ExitCode> {
    let addr = loaded.config.listen_addr();
    tracing::info!(
        "device-release-service v{} starting (contract {}, gateway {})",
        env!("CARGO_PKG_VERSION"),
        loaded.contract,
        loaded.config.gateway_url
    );

    let server = http::bind(addr).with_context(|| format!("failed to bind {addr}"))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Signal received, shutting down");
        let _ = shutdown_tx.send(true);
    });

    http::serve(api(&loaded), server, shutdown_rx).await?;
    Ok(ExitCode::SUCCESS)
}
