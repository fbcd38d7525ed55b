//! Server startup utilities.

use referral_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
    ____       ____                      __
   / __ \___  / __/__  ______________ _/ /
  / /_/ / _ \/ /_/ _ \/ ___/ ___/ __ `/ /
 / _, _/  __/ __/  __/ /  / /  / /_/ / /
/_/ |_|\___/_/  \___/_/  /_/   \__,_/_/

                  Cache
    "#);
}

/// Prints startup information without exposing credentials.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Application: {} v{}", config.app.name, config.app.version);
    info!("Environment: {}", config.app.environment);
    info!(
        "Database:    pool {}..{} connections",
        config.database.min_connections, config.database.max_connections
    );
    if config.redis.enabled {
        info!(
            "Redis:       enabled, pool size {}, key prefix '{}'",
            config.redis.pool_size, config.redis.key_prefix
        );
    } else {
        info!("Redis:       disabled");
    }
    info!("{}", separator);
}
