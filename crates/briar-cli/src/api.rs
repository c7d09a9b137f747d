use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use briar_core::{BehaviorSample, TrackingData};
use briar_db::TrustStore;
use briar_engine::Engine;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

pub struct ApiState {
    pub engine: Engine,
    pub db: TrustStore,
}

pub fn api_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/behavior/track", post(track_handler))
        .route("/api/trust/{user_id}", get(trust_handler))
        .route("/api/captcha/verified", post(captcha_verified_handler))
        .route("/api/logs", get(logs_handler))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "briar-api"
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackRequest {
    user_id: Option<String>,
    behavior_data: Option<BehaviorPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BehaviorPayload {
    #[serde(default)]
    tracking_data: TrackingData,
}

async fn track_handler(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<TrackRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    // Boundary validation only; the scoring core itself never rejects.
    let (user_id, payload) = match (body.user_id, body.behavior_data) {
        (Some(uid), Some(payload)) if !uid.is_empty() => (uid, payload),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "userId and behaviorData are required" })),
            ));
        }
    };

    let sample = BehaviorSample {
        user_id: user_id.clone(),
        tracking_data: payload.tracking_data,
    };

    let analysis = state.engine.analyze(&sample).await;
    let result = &analysis.result;
    let method = analysis.method.as_tag();

    // Persistence is fire-and-forget: a degraded store never blocks the
    // score response.
    let mut database_saved = true;
    if let Err(e) = state.db.upsert_trust(&user_id, result.trust_score) {
        warn!(user = %user_id, error = %e, "trust upsert failed");
        database_saved = false;
    }
    let behavior_json = serde_json::to_string(&sample).unwrap_or_else(|_| "{}".to_string());
    if let Err(e) = state
        .db
        .append_behavior_log(&user_id, &behavior_json, result.trust_score, &method)
    {
        warn!(user = %user_id, error = %e, "behavior log append failed");
        database_saved = false;
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "trustScore": result.trust_score,
        "trustLevel": result.trust_level,
        "needsCaptcha": result.needs_captcha,
        "confidence": result.confidence,
        "reasons": result.reasons,
        "analysisMethod": method,
        "databaseSaved": database_saved,
        "metadata": result.metadata,
    })))
}

async fn trust_handler(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let stored = state
        .db
        .get_trust(&user_id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    // Unknown users start at zero and get challenged until scored.
    let score = stored.unwrap_or(0.0);
    Ok(Json(serde_json::json!({
        "trustScore": score,
        "showCaptcha": score < 0.5,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptchaVerifiedBody {
    user_id: String,
}

async fn captcha_verified_handler(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<CaptchaVerifiedBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let floor = state.engine.policy().captcha_success_floor;
    let score = state
        .db
        .apply_captcha_boost(&body.user_id, floor)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "trustScore": score,
    })))
}

#[derive(Deserialize)]
struct PaginationParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

async fn logs_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let logs = state
        .db
        .recent_logs(params.limit)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(serde_json::to_value(&logs).unwrap_or_default()))
}

async fn stats_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let stats = state
        .db
        .stats()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(serde_json::to_value(&stats).unwrap_or_default()))
}
