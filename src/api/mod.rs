use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::config::PresentationConfig;
use crate::controller::ApplicationController;
use crate::view::ViewModel;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ApplicationController>,
    pub presentation: PresentationConfig,
}

#[derive(Serialize, Deserialize)]
pub struct QueryRequest {
    pub location: String,
}

#[derive(Serialize, Deserialize)]
pub struct QueryAccepted {
    pub generation: u64,
}

#[derive(Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/query", post(submit_query))
        .route("/health", get(health))
        .with_state(state)
}

async fn get_state(State(state): State<AppState>) -> Json<ViewModel> {
    let snapshot = state.controller.snapshot();
    Json(ViewModel::from_state(&snapshot, &state.presentation))
}

async fn submit_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Response {
    match state.controller.submit_query(&payload.location) {
        Some(ticket) => (
            StatusCode::ACCEPTED,
            Json(QueryAccepted {
                generation: ticket.generation,
            }),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}
