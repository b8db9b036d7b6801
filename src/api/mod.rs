//! Minimal HTTP API for headless mode.
//!
//! Exposes the same rendering output the terminal dashboard draws: the
//! record snapshot, the summary values, the rendered panels and the
//! toggle action.

use crate::core::config::ApiConfig;
use crate::core::{CheckRecord, NetpulseError, Result};
use crate::engine::{DashboardView, SharedEngine, Summary};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// API server state.
#[derive(Clone)]
struct ApiState {
    engine: SharedEngine,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    engine: String,
    records: usize,
}

/// Summary values and engine label.
#[derive(Debug, Serialize)]
struct SummaryResponse {
    #[serde(flatten)]
    summary: Summary,
    avg_latency_label: String,
    engine: String,
    last_sync: Option<String>,
    clock: Option<String>,
    countdown: Option<String>,
}

/// Rendered panels for one query.
#[derive(Debug, Serialize)]
struct TreeResponse {
    query: String,
    #[serde(flatten)]
    view: DashboardView,
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    /// Filter; empty matches everything
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    key: String,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    key: String,
    expanded: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

/// Build the API router.
pub fn router(engine: SharedEngine, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/tree", get(tree_handler))
        .route("/api/toggle", post(toggle_handler))
        .with_state(ApiState { engine })
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
    } else {
        app
    }
}

/// Start the API server and serve until the task is dropped.
pub async fn start_server(engine: SharedEngine, config: &ApiConfig) -> Result<()> {
    let app = router(engine, config.enable_cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| NetpulseError::network(format!("Failed to bind to {}: {}", addr, e)))?;
    tracing::info!("Starting API server on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| NetpulseError::network(format!("API server error: {}", e)))?;

    Ok(())
}

/// GET /health
async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let engine = state.engine.lock();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        engine: engine.status().label(),
        records: engine.records().len(),
    })
}

/// GET /api/stats - current record snapshot
async fn stats_handler(State(state): State<ApiState>) -> Json<Vec<CheckRecord>> {
    let records = state.engine.lock().records();
    Json(records.as_ref().clone())
}

/// GET /api/summary
async fn summary_handler(State(state): State<ApiState>) -> Json<SummaryResponse> {
    let engine = state.engine.lock();
    let summary = engine.summary();
    let tick = engine.last_tick();
    Json(SummaryResponse {
        summary,
        avg_latency_label: summary.latency_label(),
        engine: engine.status().label(),
        last_sync: engine.last_sync().map(|t| t.to_rfc3339()),
        clock: tick.map(|t| t.clock.clone()),
        countdown: tick.and_then(|t| t.countdown.clone()),
    })
}

/// GET /api/tree?q=
async fn tree_handler(State(state): State<ApiState>, Query(params): Query<TreeQuery>) -> Json<TreeResponse> {
    let view = state.engine.lock().view_with(&params.q);
    Json(TreeResponse { query: params.q, view })
}

/// POST /api/toggle
async fn toggle_handler(State(state): State<ApiState>, Json(request): Json<ToggleRequest>) -> impl IntoResponse {
    if request.key.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Field 'key' must not be empty".to_string(),
                code: 400,
            }),
        )
            .into_response();
    }

    let expanded = state.engine.lock().toggle(&request.key);
    Json(ToggleResponse {
        key: request.key,
        expanded,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_before_first_refresh() {
        let app = router(Engine::default().shared(), true);
        let (status, body) = call(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["engine"], "ENGINE: STARTING");
        assert_eq!(body["records"], 0);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let engine = Engine::default().shared();
        let request = || {
            Request::builder()
                .method("POST")
                .uri("/api/toggle")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"key":"section-degraded"}"#))
                .unwrap()
        };

        let (status, body) = call(router(engine.clone(), false), request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expanded"], false);

        let (_, body) = call(router(engine.clone(), false), request()).await;
        assert_eq!(body["expanded"], true);
    }

    #[tokio::test]
    async fn test_toggle_rejects_empty_key() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/toggle")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"key":"  "}"#))
            .unwrap();
        let (status, body) = call(router(Engine::default().shared(), false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_tree_shows_placeholder() {
        let (status, body) = call(router(Engine::default().shared(), false), get("/api/tree?q=edge")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "edge");
        assert_eq!(body["operational"]["placeholder"], "Synchronizing infra...");
    }
}
