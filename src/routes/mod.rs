use crate::error::Result;
use crate::patient::PatientService;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<PatientService>,
}

/// Build the HTTP surface over the patient facade
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/patients", post(create_patient))
        .route(
            "/patients/:id",
            get(fetch_patient).put(update_patient).delete(delete_patient),
        )
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "fhir-bridge Patient API is running." }))
}

async fn create_patient(
    State(state): State<AppState>,
    Json(patient): Json<Value>,
) -> Result<Json<Value>> {
    state.patients.create(patient).await.map(Json)
}

async fn fetch_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.patients.fetch_by_id(&id).await.map(Json)
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patient): Json<Value>,
) -> Result<Json<Value>> {
    state.patients.update(&id, patient).await.map(Json)
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.patients.delete(&id).await.map(Json)
}
