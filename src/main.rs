// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use clap::Parser;
use kube::Client;
use maildomain_operator::{
    config::OperatorArgs,
    constants::{METRICS_SERVER_BIND_ADDRESS, TOKIO_WORKER_THREADS},
    context::Context,
    domain_controller::run_domain_controller,
    metrics::serve_metrics,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let args = OperatorArgs::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("maildomain-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`text` or `json`).
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(args: OperatorArgs) -> Result<()> {
    init_logging();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting mail domain operator");
    args.validate().context("invalid configuration")?;
    debug!(config = ?args, "Configuration loaded");

    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;
    debug!("Kubernetes client initialized successfully");

    let context = Arc::new(Context::from_client(
        client.clone(),
        &args.probe_config(),
        args.reconciler_config(),
    ));

    let bind_ip: IpAddr = METRICS_SERVER_BIND_ADDRESS
        .parse()
        .context("invalid metrics bind address")?;
    let metrics_addr = SocketAddr::new(bind_ip, args.metrics_port);

    // The controller returns once a shutdown signal was handled; the metrics
    // server should never exit on its own.
    tokio::select! {
        result = run_domain_controller(client, context, args.watch_namespace.clone()) => {
            result?;
            info!("Shutdown complete");
            Ok(())
        }
        result = serve_metrics(metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result.context("metrics server failed")?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
    }
}
