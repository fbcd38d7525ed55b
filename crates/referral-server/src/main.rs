//! # Referral Server
//!
//! Wiring and health-check harness for the referral cache stack. It loads
//! configuration, builds the DI module, checks the database and keeps the
//! connection pools alive until a shutdown signal arrives.
//!
//! No request surface is exposed. An embedding application resolves
//! `ReferralService` from the module built by `referral_server::di` and
//! serves it through its own transport.

use referral_config::{AppConfig, ConfigLoader};
use referral_core::telemetry::{init_logging, LoggingConfig};
use referral_core::ReferralResult;
use referral_server::di::{build_referral_module, ReferralResolver};
use referral_server::startup::{print_banner, print_startup_info};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            let _ = init_logging(&LoggingConfig::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    print_banner();
    info!("Starting referral server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> ReferralResult<()> {
    let module = build_referral_module(&config).await?;

    let database = module.database_pool();
    database.health_check().await?;
    info!("Database health check passed");

    if !module.cache_store().is_enabled() {
        info!("Running without a cache store");
    }

    let _service = module.referral_service();
    info!("Referral service wired");

    print_startup_info(&config);

    shutdown_signal().await;

    database.close().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
