// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, error::Error, sync::Arc};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relational_funding_server::{
    api::router,
    blockchain::{CustodialWallet, EvmConnector, NetworkRegistry},
    config::{rpc_url_env, AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    tracing::debug!(?config, "Configuration loaded");

    let wallet = config
        .funder_secret
        .as_deref()
        .map(CustodialWallet::from_secret)
        .transpose()?;
    match &wallet {
        Some(wallet) => tracing::info!(funder = %wallet.address(), "Custodial wallet loaded"),
        None => tracing::warn!("No custodial secret configured, funding is disabled"),
    }

    let registry = NetworkRegistry::with_rpc_overrides(|chain_id| env::var(rpc_url_env(chain_id)).ok())?;
    for network in registry.iter() {
        tracing::info!(
            chain_id = %network.chain_id,
            network = %network.name,
            funding_amount = %network.funding_amount,
            "Network registered"
        );
    }

    let connector = Arc::new(EvmConnector::new(config.ledger));
    let app = router(AppState::new(registry, wallet, connector));

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Relational funding server listening (docs at /docs)");

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Cancel `token` on SIGINT or SIGTERM.
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
    token.cancel();
}
