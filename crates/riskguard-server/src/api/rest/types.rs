//! REST API type definitions

use riskguard_sdk::{CaseStatus, FraudCase, FraudEngine, TransactionRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FraudEngine>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchScoreRequest {
    pub transactions: Vec<TransactionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub acknowledged_by: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub assignee: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: CaseStatus,

    #[serde(default)]
    pub resolution_notes: Option<String>,

    /// Confirmed loss, recorded when the case is closed as fraud
    #[serde(default)]
    pub actual_loss: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub author: String,
    pub content: String,

    #[serde(default)]
    pub is_internal: bool,
}

/// Cases opened by an escalation rescan
#[derive(Debug, Serialize)]
pub struct EscalationResponse {
    pub escalated: usize,
    pub cases: Vec<FraudCase>,
}
