use fhir_bridge::{config::BridgeConfig, init_bridge, init_tracing};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize tracing
    init_tracing();

    // Get config file path from command line or use default
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config/bridge.yaml".to_string());

    // Load configuration
    let mut config = match BridgeConfig::from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", config_path, e);
            eprintln!("Usage: fhir-bridge [config_file]");
            process::exit(1);
        }
    };

    // BACKENDURL takes precedence over the file, as in deployment scripts
    config.override_from_env();

    // Start the bridge
    if let Err(e) = init_bridge(config).await {
        eprintln!("Bridge error: {}", e);
        process::exit(1);
    }
}
