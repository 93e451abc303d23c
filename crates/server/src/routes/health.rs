use std::sync::Arc;

use axum::{Extension, Json};
use opening_classifier::OpeningEngine;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub entries: usize,
    pub positions: usize,
}

/// GET /health
pub async fn health_check(Extension(engine): Extension<Arc<OpeningEngine>>) -> Json<HealthResponse> {
    let catalogue = engine.catalogue();
    Json(HealthResponse {
        status: "ok",
        entries: catalogue.len(),
        positions: catalogue.position_count(),
    })
}
