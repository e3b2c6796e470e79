use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uact_admin::{server, Config};

#[tokio::main]
async fn main() {
    // Load configuration
    let config_path = std::env::var("UACT_CONFIG").ok();
    let config = Config::load(config_path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        std::process::exit(1);
    });

    // Initialize tracing with configured log level
    let log_level = match config.log_level.as_str() {
        "trace" => "uact_admin=trace,tower_http=debug,tower_sessions=debug",
        "debug" => "uact_admin=debug,tower_http=debug,tower_sessions=info",
        "info" => "uact_admin=info,tower_http=info,tower_sessions=warn",
        "warn" => "uact_admin=warn,tower_http=warn,tower_sessions=warn",
        "error" => "uact_admin=error,tower_http=error,tower_sessions=error",
        _ => "uact_admin=info,tower_http=info,tower_sessions=warn",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run server
    if let Err(e) = server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
