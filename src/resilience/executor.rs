use super::breaker::CircuitBreaker;
use super::retry::RetryExecutor;
use crate::backend::{BackendResponse, FhirBackend};
use crate::error::{BridgeError, Result};
use http::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs each resource operation through the circuit breaker gate, the retry
/// loop, and the backend transport, in that order.
///
/// The breaker sees the whole retry-wrapped call as a single unit: a call
/// that needed three transport attempts before succeeding records one
/// success, and one that exhausts its retries records exactly one failure.
pub struct ResilientExecutor {
    backend: FhirBackend,
    retry: RetryExecutor,
    breaker: Arc<CircuitBreaker>,
}

impl ResilientExecutor {
    pub fn new(backend: FhirBackend, retry: RetryExecutor, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            backend,
            retry,
            breaker,
        }
    }

    /// Execute one logical backend operation
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<BackendResponse> {
        if !self.breaker.can_proceed().await {
            warn!(path = %path, "Circuit breaker open, rejecting backend call");
            return Err(BridgeError::CircuitOpen);
        }

        let result = self
            .retry
            .execute(
                || {
                    let backend = self.backend.clone();
                    let method = method.clone();
                    let path = path.to_string();
                    let body = body.cloned();
                    async move {
                        let response = backend.send(method, &path, body.as_ref()).await?;
                        classify(response)
                    }
                },
                BridgeError::is_transient,
            )
            .await;

        match &result {
            // A 404 is an authoritative backend answer, not a backend failure
            Ok(_) | Err(BridgeError::NotFound) => self.breaker.record_success().await,
            Err(e) => {
                debug!(path = %path, error = %e, "Logical backend call failed");
                self.breaker.record_failure().await;
            }
        }

        result
    }
}

/// Map one backend response to the executor's outcome taxonomy
fn classify(response: BackendResponse) -> Result<BackendResponse> {
    let status = response.status;
    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::NOT_FOUND {
        Err(BridgeError::NotFound)
    } else {
        Err(BridgeError::Backend(
            status.as_u16(),
            response.body.to_string(),
        ))
    }
}
