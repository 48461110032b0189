//! API endpoint handlers

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use riskguard_sdk::{
    Alert, BatchScoreResponse, CaseNote, CaseView, DetailedScoreResponse, FeatureInfo, FraudCase,
    ProcessedTransaction, ScoreResponse, TransactionRequest,
};
use riskguard_runtime::observability::MetricsSnapshot;
use tracing::info;

fn require(field: &str, value: &str) -> Result<(), ServerError> {
    if value.trim().is_empty() {
        return Err(ServerError::InvalidRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Health check endpoint
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_configured: state.engine.feature_info().model_configured,
    })
}

/// Counters and latency histograms collected by the engine
pub(super) async fn metrics(
    State(state): State<AppState>,
) -> Result<Json<MetricsSnapshot>, ServerError> {
    state
        .engine
        .metrics()
        .map(|collector| Json(collector.snapshot()))
        .ok_or_else(|| ServerError::NotFound("metrics are disabled".to_string()))
}

pub(super) async fn feature_info(State(state): State<AppState>) -> Json<FeatureInfo> {
    Json(state.engine.feature_info())
}

#[axum::debug_handler]
pub(super) async fn score(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<TransactionRequest>,
) -> Result<Json<ScoreResponse>, ServerError> {
    Ok(Json(state.engine.score(payload).await?))
}

pub(super) async fn score_detailed(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<TransactionRequest>,
) -> Result<Json<DetailedScoreResponse>, ServerError> {
    Ok(Json(state.engine.score_detailed(payload).await?))
}

pub(super) async fn score_batch(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<BatchScoreRequest>,
) -> Result<Json<BatchScoreResponse>, ServerError> {
    info!(size = payload.transactions.len(), "Received batch score request");
    Ok(Json(state.engine.score_batch(payload.transactions).await?))
}

#[axum::debug_handler]
pub(super) async fn process_transaction(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<TransactionRequest>,
) -> Result<(StatusCode, Json<ProcessedTransaction>), ServerError> {
    let processed = state.engine.process_transaction(payload).await?;
    Ok((StatusCode::CREATED, Json(processed)))
}

pub(super) async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    JsonExtractor(payload): JsonExtractor<AcknowledgeRequest>,
) -> Result<Json<Alert>, ServerError> {
    require("acknowledged_by", &payload.acknowledged_by)?;
    Ok(Json(
        state
            .engine
            .acknowledge_alert(&alert_id, &payload.acknowledged_by)
            .await?,
    ))
}

/// Open cases for overdue unacknowledged alerts
pub(super) async fn escalate_alerts(
    State(state): State<AppState>,
) -> Result<Json<EscalationResponse>, ServerError> {
    let cases = state.engine.escalate_pending().await?;
    info!(escalated = cases.len(), "Escalation rescan finished");
    Ok(Json(EscalationResponse {
        escalated: cases.len(),
        cases,
    }))
}

pub(super) async fn get_case(
    State(state): State<AppState>,
    Path(case_number): Path<String>,
) -> Result<Json<CaseView>, ServerError> {
    Ok(Json(state.engine.get_case(&case_number).await?))
}

pub(super) async fn assign_case(
    State(state): State<AppState>,
    Path(case_number): Path<String>,
    JsonExtractor(payload): JsonExtractor<AssignRequest>,
) -> Result<Json<FraudCase>, ServerError> {
    require("assignee", &payload.assignee)?;
    Ok(Json(
        state
            .engine
            .assign_case(&case_number, &payload.assignee)
            .await?,
    ))
}

pub(super) async fn update_case_status(
    State(state): State<AppState>,
    Path(case_number): Path<String>,
    JsonExtractor(payload): JsonExtractor<StatusUpdateRequest>,
) -> Result<Json<FraudCase>, ServerError> {
    Ok(Json(
        state
            .engine
            .update_case_status(
                &case_number,
                payload.status,
                payload.resolution_notes,
                payload.actual_loss,
            )
            .await?,
    ))
}

pub(super) async fn add_case_note(
    State(state): State<AppState>,
    Path(case_number): Path<String>,
    JsonExtractor(payload): JsonExtractor<NoteRequest>,
) -> Result<(StatusCode, Json<CaseNote>), ServerError> {
    require("author", &payload.author)?;
    let note = state
        .engine
        .add_case_note(
            &case_number,
            &payload.author,
            &payload.content,
            payload.is_internal,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}
