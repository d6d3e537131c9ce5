use crate::config::BackendConfig;
use crate::error::{BridgeError, Result};
use http::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

/// Outcome of one transport attempt: the backend's status code plus its
/// body parsed as JSON (`Null` for empty bodies, a plain string when the
/// body is not JSON).
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Thin async HTTP client bound to one FHIR base URL.
///
/// Connection and timeout errors surface as transient faults; any response
/// the backend actually produced is returned as-is for the executor to
/// classify.
#[derive(Debug, Clone)]
pub struct FhirBackend {
    client: reqwest::Client,
    base_url: String,
}

impl FhirBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issue one request against the backend
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<BackendResponse> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(method = %method, url = %url, "Sending backend request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(classify_transport_error)?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(BackendResponse { status, body })
    }
}

/// Triage a reqwest error into the bridge taxonomy
fn classify_transport_error(e: reqwest::Error) -> BridgeError {
    if e.is_timeout() {
        BridgeError::Transient(format!("Backend request timed out: {}", e))
    } else if e.is_connect() {
        BridgeError::Transient(format!("Failed to connect to backend: {}", e))
    } else {
        BridgeError::Unknown(format!("Backend request failed: {}", e))
    }
}
