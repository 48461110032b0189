//! Router creation and configuration

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use riskguard_sdk::FraudEngine;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(engine: Arc<FraudEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/v1/features/info", get(feature_info))
        .route("/v1/score", post(score))
        .route("/v1/score/detailed", post(score_detailed))
        .route("/v1/score/batch", post(score_batch))
        .route("/v1/transactions", post(process_transaction))
        .route("/v1/alerts/escalate", post(escalate_alerts))
        .route("/v1/alerts/:alert_id/acknowledge", post(acknowledge_alert))
        .route("/v1/cases/:case_number", get(get_case))
        .route("/v1/cases/:case_number/assign", post(assign_case))
        .route("/v1/cases/:case_number/status", post(update_case_status))
        .route("/v1/cases/:case_number/notes", post(add_case_note))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
