use crate::error::{BridgeError, Result};
use crate::resilience::{CircuitBreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// FHIR backend configuration
    pub backend: BackendConfig,
    /// Circuit breaker configuration
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// FHIR backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend base URL
    pub base_url: String,
    /// Verify TLS certificates (off by default for dev backends with
    /// self-signed certs; turn on in production)
    #[serde(default)]
    pub verify_tls: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BridgeConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| BridgeError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides (`BACKENDURL` replaces the backend base URL)
    pub fn override_from_env(&mut self) {
        if let Ok(url) = std::env::var("BACKENDURL") {
            self.backend.base_url = url;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.is_empty() {
            return Err(BridgeError::Config(
                "Backend base URL cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(&self.backend.base_url)
            .map_err(|e| BridgeError::Config(format!("Invalid backend base URL: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(BridgeError::Config(format!(
                "Backend base URL must use http or https, got: {}",
                url.scheme()
            )));
        }

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(BridgeError::Config(
                "Circuit breaker failure threshold must be > 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(BridgeError::Config(
                "Retry max attempts must be > 0".to_string(),
            ));
        }

        if self.retry.min_delay_ms > self.retry.max_delay_ms {
            return Err(BridgeError::Config(
                "Retry min delay must not exceed max delay".to_string(),
            ));
        }

        Ok(())
    }
}
