pub mod clients;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use opening_classifier::OpeningEngine;
use tower_http::cors::{Any, CorsLayer};

use crate::clients::callback::CallbackClient;
use crate::config::Config;

/// The HTTP surface: health and classification, with shared state as extensions.
pub fn app(engine: Arc<OpeningEngine>, config: Config, callback: Option<CallbackClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/classify", post(routes::classify::classify_game))
        .layer(Extension(engine))
        .layer(Extension(config))
        .layer(Extension(callback))
        .layer(cors)
}
