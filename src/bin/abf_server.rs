//! Lifecycle entry point: loads configuration, wires the admission service,
//! and runs until a shutdown signal arrives. Stands in for a transport
//! binding without owning any wire protocol of its own.

use std::sync::Arc;

use abf_gate::{AdmissionService, AppConfig, InMemorySubnetList, KeyedBucketStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(port = config.listen.port, "starting abf-server");

    let login_store = KeyedBucketStore::new(config.limiters.login.to_store_config());
    let password_store = KeyedBucketStore::new(config.limiters.password.to_store_config());
    let ip_store = KeyedBucketStore::new(config.limiters.ip.to_store_config());

    let service = Arc::new(AdmissionService::new(
        login_store.clone(),
        password_store.clone(),
        ip_store.clone(),
        InMemorySubnetList::new(),
        InMemorySubnetList::new(),
    ));
    // A transport binding would be constructed around `service` here and
    // driven from this same task alongside the shutdown signal below.
    let _ = service;

    wait_for_shutdown().await;

    tracing::info!("shutting down, closing bucket stores");
    login_store.close();
    password_store.close();
    ip_store.close();

    std::process::exit(0);
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
