use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::area::KnowledgeArea;
use super::catalog::FieldView;
use super::interpretation::interpret;
use super::level::{LevelChart, PerformanceLevel};
use super::pipeline::{PredictionContext, PredictionOutcome, PredictionRequest};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct AreaView {
    area: KnowledgeArea,
    label: &'static str,
    levels: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    fields: Vec<FieldView>,
    areas: Vec<AreaView>,
}

/// Router exposing prediction, catalog, model status, and interpretation lookups.
pub fn prediction_router(context: Arc<PredictionContext>) -> Router {
    Router::new()
        .route("/api/v1/predictions", post(predict_handler))
        .route("/api/v1/catalog", get(catalog_handler))
        .route("/api/v1/models", get(models_handler))
        .route(
            "/api/v1/interpretations/:area/:level",
            get(interpretation_handler),
        )
        .with_state(context)
}

/// Malformed bodies become a 400 carrying the `{error}` payload.
pub(crate) async fn predict_handler(
    State(context): State<Arc<PredictionContext>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionOutcome>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Input(rejection.body_text()))?;
    Ok(Json(context.predict(&request)))
}

pub(crate) async fn catalog_handler(State(context): State<Arc<PredictionContext>>) -> Response {
    let areas = KnowledgeArea::ALL
        .into_iter()
        .filter(|area| context.catalog().binding(*area).is_some())
        .map(|area| AreaView {
            area,
            label: area.label(),
            levels: area.level_labels(),
        })
        .collect();

    let body = CatalogResponse {
        fields: context.catalog().field_views(),
        areas,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn models_handler(State(context): State<Arc<PredictionContext>>) -> Response {
    let models = context.models().status();
    let payload = json!({
        "available": context.models().available_count(),
        "models": models,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

/// Unrecognized areas resolve to the area-selection placeholder, and levels that are
/// not a small non-negative integer to the level placeholder.
pub(crate) async fn interpretation_handler(
    State(context): State<Arc<PredictionContext>>,
    Path((area, level)): Path<(String, String)>,
) -> Response {
    let area = KnowledgeArea::from_slug(&area);
    let level = PerformanceLevel(level.trim().parse().unwrap_or(0));
    let payload = json!({
        "area": area,
        "level": level,
        "chart": LevelChart::for_level(area, level),
        "interpretation": interpret(area, level, context.bands()),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Distribution, InferenceError, InferenceModel, ModelRegistry};
    use crate::prediction::bands::ScoreBands;
    use crate::prediction::catalog::fixtures::catalog;
    use crate::prediction::evidence::Evidence;
    use crate::prediction::interpretation::{SELECT_AREA_PLACEHOLDER, SELECT_LEVEL_PLACEHOLDER};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use std::collections::HashMap;
    use tower::ServiceExt;

    struct SkewedModel;

    impl InferenceModel for SkewedModel {
        fn name(&self) -> &str {
            "skewed"
        }

        fn target_states(&self, target: &str) -> Option<Vec<String>> {
            let levels = if target == "DESEMP_INGLES" || target == "DESEMP_GLOBAL" {
                5
            } else {
                4
            };
            Some((1..=levels).map(|n| n.to_string()).collect())
        }

        fn query(&self, target: &str, _: &Evidence) -> Result<Distribution, InferenceError> {
            let states = self.target_states(target).unwrap_or_default();
            let mut probabilities = vec![0.1; states.len()];
            if let Some(last) = probabilities.last_mut() {
                *last = 1.0 - 0.1 * (states.len() - 1) as f64;
            }
            Ok(Distribution {
                states,
                probabilities,
                ignored: Vec::new(),
            })
        }
    }

    fn router() -> Router {
        let catalog = catalog();
        let mut models: HashMap<String, Arc<dyn InferenceModel>> = HashMap::new();
        models.insert("saber11".to_string(), Arc::new(SkewedModel));
        let registry = ModelRegistry::from_models(&catalog, models);
        prediction_router(Arc::new(PredictionContext::new(
            catalog,
            registry,
            ScoreBands::default(),
        )))
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn prediction_route_returns_level_and_interpretation() {
        let payload = json!({
            "area": "ingles",
            "fields": {
                "gender": "F",
                "household_resources": ["internet", "car"],
                "school_type": null
            }
        });

        let response = router()
            .oneshot(
                Request::post("/api/v1/predictions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "predicted");
        assert_eq!(body["area"], "english");
        assert_eq!(body["level"], 5);
        assert_eq!(body["evidence"]["FAMI_RECURSOS"], "3");
        assert_eq!(body["chart"]["labels"][4], "B+");
        assert!(body["interpretation"]["heading"]
            .as_str()
            .expect("heading is text")
            .starts_with("Nivel B+"));
    }

    #[tokio::test]
    async fn prediction_route_without_area_is_neutral() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/predictions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"fields":{"gender":"M"}}"#))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "no_area_selected");
        assert_eq!(body["level"], 0);
        assert_eq!(body["interpretation"]["placeholder"], true);
    }

    #[tokio::test]
    async fn prediction_route_rejects_malformed_body() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/predictions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"fields":["gender"]}"#))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error is text")
            .starts_with("invalid input"));
    }

    #[tokio::test]
    async fn catalog_route_lists_fields_and_areas() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/catalog")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["fields"].as_array().map(Vec::len), Some(5));
        assert_eq!(body["areas"].as_array().map(Vec::len), Some(6));
    }

    #[tokio::test]
    async fn models_route_reports_availability() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/models")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        let body = read_json(response).await;
        assert_eq!(body["available"], 6);
    }

    #[tokio::test]
    async fn interpretation_route_handles_unknown_inputs() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/interpretations/astronomy/2")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert!(body["area"].is_null());
        assert_eq!(body["interpretation"]["text"], SELECT_AREA_PLACEHOLDER);

        let response = router()
            .oneshot(
                Request::get("/api/v1/interpretations/lectura_critica/5")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["interpretation"]["text"], SELECT_LEVEL_PLACEHOLDER);
    }

    #[tokio::test]
    async fn interpretation_route_accepts_any_level_text() {
        for level in ["300", "-1", "dos"] {
            let response = router()
                .oneshot(
                    Request::get(format!("/api/v1/interpretations/mathematics/{level}"))
                        .body(Body::empty())
                        .expect("request builds"),
                )
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK, "level {level}");
            let body = read_json(response).await;
            assert_eq!(body["level"], 0);
            assert_eq!(body["interpretation"]["text"], SELECT_LEVEL_PLACEHOLDER);
        }
    }
}
