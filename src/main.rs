// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use content_gateway::{
    api::router,
    chain::RpcConnector,
    config::{GatewayConfig, LogFormat},
    relay::HttpFetcher,
    state::AppState,
};
use tracing_subscriber::EnvFilter;

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    init_tracing(config.log_format);

    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        contract = %config.chain.contract_id,
        "Starting content gateway"
    );
    if config.chain.uses_default_rpc_url() {
        tracing::warn!(
            rpc_url = %config.chain.rpc_url,
            "RPC_URL not set; the default node must serve registry_getContractKey and contract_query or every content request answers 503"
        );
    }

    let state = AppState::new(
        config.chain.clone(),
        Arc::new(RpcConnector),
        Arc::new(HttpFetcher::default()),
    );
    let app = router(state);

    let handle: Handle<std::net::SocketAddr> = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let addr = config.bind_addr;
    let served = match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load TLS certificate/key");
                    process::exit(1);
                }
            };

            tracing::info!("Content gateway listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            tracing::info!("Content gateway listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = served {
        tracing::error!(error = %e, "Server failed");
        process::exit(1);
    }

    tracing::info!("Content gateway stopped");
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal(handle: Handle<std::net::SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
