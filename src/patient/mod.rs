use crate::error::Result;
use crate::resilience::ResilientExecutor;
use crate::sanitize::strip_internal_meta;
use http::Method;
use serde_json::{json, Value};
use tracing::info;

/// Patient resource operations built on the resilient executor.
///
/// Payloads are opaque documents; this layer does not interpret the
/// resource schema beyond stripping internal metadata from results.
pub struct PatientService {
    executor: ResilientExecutor,
}

impl PatientService {
    pub fn new(executor: ResilientExecutor) -> Self {
        Self { executor }
    }

    pub async fn create(&self, patient: Value) -> Result<Value> {
        info!("Creating patient");
        let response = self
            .executor
            .execute(Method::POST, "Patient", Some(&patient))
            .await?;
        Ok(strip_internal_meta(response.body))
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<Value> {
        info!(id = %id, "Fetching patient");
        let response = self
            .executor
            .execute(Method::GET, &format!("Patient/{}", id), None)
            .await?;
        Ok(strip_internal_meta(response.body))
    }

    pub async fn update(&self, id: &str, patient: Value) -> Result<Value> {
        info!(id = %id, "Updating patient");
        let response = self
            .executor
            .execute(Method::PUT, &format!("Patient/{}", id), Some(&patient))
            .await?;
        Ok(strip_internal_meta(response.body))
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        info!(id = %id, "Deleting patient");
        self.executor
            .execute(Method::DELETE, &format!("Patient/{}", id), None)
            .await?;
        Ok(json!({ "detail": "Patient deleted" }))
    }
}
