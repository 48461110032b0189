//! Analyst-facing case and alert operations
//!
//! Lifecycle rules live on [`FraudCase`] and [`Alert`]; the store applies
//! each transition against the row it holds, so concurrent analysts never
//! overwrite each other's changes.

use crate::error::{Result, RuntimeError};
use crate::storage::{CaseUpdate, FraudStore};
use chrono::{DateTime, Utc};
use riskguard_core::{Alert, CaseNote, CaseStatus, CoreError, FraudCase, FraudPattern};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub struct CaseService {
    store: Arc<dyn FraudStore>,
}

impl CaseService {
    pub fn new(store: Arc<dyn FraudStore>) -> Self {
        Self { store }
    }

    pub async fn get_case(&self, case_number: &str) -> Result<FraudCase> {
        self.store
            .get_case(case_number)
            .await?
            .ok_or_else(|| RuntimeError::NotFound(format!("case {}", case_number)))
    }

    pub async fn assign(
        &self,
        case_number: &str,
        assignee: &str,
        now: DateTime<Utc>,
    ) -> Result<FraudCase> {
        let case = self
            .store
            .modify_case(
                case_number,
                CaseUpdate::Assign {
                    assignee: assignee.to_string(),
                },
                now,
            )
            .await?;

        info!(case_number = %case_number, assignee = %assignee, "case assigned");
        Ok(case)
    }

    pub async fn update_status(
        &self,
        case_number: &str,
        status: CaseStatus,
        resolution_notes: Option<String>,
        actual_loss: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<FraudCase> {
        let case = self
            .store
            .modify_case(
                case_number,
                CaseUpdate::Status {
                    status,
                    resolution_notes,
                    actual_loss,
                },
                now,
            )
            .await?;

        info!(case_number = %case_number, status = status.as_str(), "case status updated");
        Ok(case)
    }

    pub async fn add_note(
        &self,
        case_number: &str,
        author: &str,
        content: &str,
        is_internal: bool,
        now: DateTime<Utc>,
    ) -> Result<CaseNote> {
        if content.trim().is_empty() {
            return Err(CoreError::InvalidInput("note content must not be empty".to_string()).into());
        }
        let note = CaseNote::new(case_number, author, content, is_internal, now);
        self.store.add_note(note.clone()).await?;
        Ok(note)
    }

    /// Notes in insertion order
    pub async fn list_notes(&self, case_number: &str) -> Result<Vec<CaseNote>> {
        self.get_case(case_number).await?;
        self.store.list_notes(case_number).await
    }

    pub async fn acknowledge_alert(
        &self,
        alert_id: &str,
        acknowledged_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Alert> {
        let alert = self
            .store
            .acknowledge_alert(alert_id, acknowledged_by, now)
            .await?;

        info!(alert_id = %alert_id, by = %acknowledged_by, "alert acknowledged");
        Ok(alert)
    }

    /// Analyst verdict on a pattern detection
    pub async fn pattern_feedback(
        &self,
        pattern_id: &str,
        confirmed_fraud: bool,
    ) -> Result<FraudPattern> {
        let pattern = self
            .store
            .record_pattern_feedback(pattern_id, confirmed_fraud)
            .await?;
        info!(
            pattern_id = %pattern_id,
            confirmed_fraud,
            accuracy = pattern.accuracy(),
            "pattern feedback recorded"
        );
        Ok(pattern)
    }
}
