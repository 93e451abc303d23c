use std::sync::Arc;

use axum::{Extension, Json};
use opening_classifier::{AnalysisResult, ClassifyOptions, OpeningEngine};
use serde::Deserialize;

use crate::clients::callback::CallbackClient;
use crate::config::Config;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub moves: Option<String>,
    pub ply_limit: Option<usize>,
    #[serde(default)]
    pub options: ClassifyOptions,
}

/// POST /api/classify
/// Classify a move list. The result is also forwarded to the callback
/// receiver when one is configured.
pub async fn classify_game(
    Extension(engine): Extension<Arc<OpeningEngine>>,
    Extension(config): Extension<Config>,
    Extension(callback): Extension<Option<CallbackClient>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let moves = req
        .moves
        .ok_or_else(|| AppError::BadRequest("moves is required".to_string()))?;

    let mut options = req.options;
    options.report_limit.get_or_insert(config.report_limit);
    let ply_limit = req.ply_limit.unwrap_or(config.default_ply_limit);

    let result = tokio::task::spawn_blocking(move || engine.classify(&moves, Some(ply_limit), &options))
        .await
        .map_err(|e| AppError::Internal(format!("Classification task failed: {e}")))?;

    if let Some(client) = callback {
        client.deliver(result.clone());
    }

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opening_classifier::{Catalogue, CatalogueRecord, MatchStatus};

    fn engine() -> Arc<OpeningEngine> {
        Arc::new(OpeningEngine::new(Catalogue::from_records(vec![CatalogueRecord::new(
            Some("C60"),
            "Ruy Lopez",
            "1. e4 e5 2. Nf3 Nc6 3. Bb5",
        )])))
    }

    fn request(body: serde_json::Value) -> Json<ClassifyRequest> {
        Json(serde_json::from_value(body).unwrap())
    }

    async fn call(body: serde_json::Value, config: Config) -> Result<Json<AnalysisResult>, AppError> {
        classify_game(Extension(engine()), Extension(config), Extension(None), request(body)).await
    }

    #[tokio::test]
    async fn test_missing_moves_is_bad_request() {
        let err = call(serde_json::json!({ "ply_limit": 10 }), Config::from_lookup(|_| None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_classifies_with_configured_limits() {
        let config = Config::from_lookup(|key| match key {
            "REPORT_LIMIT" => Some("3".to_string()),
            _ => None,
        });
        let Json(result) = call(serde_json::json!({ "moves": "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6" }), config)
            .await
            .unwrap();

        assert_eq!(result.status, MatchStatus::Matched);
        assert_eq!(result.name.as_deref(), Some("Ruy Lopez"));
        assert_eq!(result.progression.len(), 3);
    }

    #[tokio::test]
    async fn test_request_limits_override_config() {
        let body = serde_json::json!({
            "moves": "1. e4 e5 2. Nf3 Nc6 3. Bb5",
            "ply_limit": 2,
            "options": { "report_limit": 1 }
        });
        let Json(result) = call(body, Config::from_lookup(|_| None)).await.unwrap();

        assert_eq!(result.plies_replayed, 2);
        assert_eq!(result.progression.len(), 1);
        // the entry passes through the position after 1...e5
        assert_eq!(result.matched_ply, Some(2));
    }
}
