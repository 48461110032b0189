//! Investigation cases and their lifecycle
//!
//! ```text
//! PENDING --assign--> INVESTIGATING --update_status--> CONFIRMED | FALSE_POSITIVE | RESOLVED
//! ```
//!
//! Terminal cases accept no further transitions.

use super::alert::{Alert, Severity};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Case status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Pending,
    Investigating,
    Confirmed,
    FalsePositive,
    Resolved,
}

impl CaseStatus {
    /// At most one active case may exist per transaction
    pub fn is_active(&self) -> bool {
        matches!(self, CaseStatus::Pending | CaseStatus::Investigating)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "PENDING",
            CaseStatus::Investigating => "INVESTIGATING",
            CaseStatus::Confirmed => "CONFIRMED",
            CaseStatus::FalsePositive => "FALSE_POSITIVE",
            CaseStatus::Resolved => "RESOLVED",
        }
    }
}

/// A fraud investigation opened for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudCase {
    pub case_number: String,
    pub transaction_reference: String,
    pub alert_id: Option<String>,
    pub title: String,
    pub description: String,
    pub status: CaseStatus,
    pub severity: Severity,
    pub assigned_to: Option<String>,
    pub estimated_loss: Option<Decimal>,
    pub actual_loss: Option<Decimal>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl FraudCase {
    /// `CASE-{YYYYMMDD}-{last 8 chars of the reference}`
    pub fn case_number_for(reference: &str, at: DateTime<Utc>) -> String {
        let start = reference
            .char_indices()
            .rev()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("CASE-{}-{}", at.format("%Y%m%d"), &reference[start..])
    }

    /// Open a pending case for an alert
    pub fn open(alert: &Alert, at: DateTime<Utc>) -> Self {
        Self {
            case_number: Self::case_number_for(&alert.transaction_reference, at),
            transaction_reference: alert.transaction_reference.clone(),
            alert_id: Some(alert.id.clone()),
            title: format!("Suspicious transaction: {}", alert.transaction_reference),
            description: alert.message.clone(),
            status: CaseStatus::Pending,
            severity: alert.severity,
            assigned_to: None,
            estimated_loss: Some(alert.amount),
            actual_loss: None,
            resolution_notes: None,
            created_at: at,
            updated_at: at,
            resolved_at: None,
        }
    }

    fn transition_error(&self, to: CaseStatus) -> CoreError {
        CoreError::InvalidTransition {
            case_number: self.case_number.clone(),
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    /// Assign an investigator; moves the case to INVESTIGATING
    pub fn assign(&mut self, assignee: impl Into<String>, at: DateTime<Utc>) -> Result<()> {
        if !self.status.is_active() {
            return Err(self.transition_error(CaseStatus::Investigating));
        }
        self.assigned_to = Some(assignee.into());
        self.status = CaseStatus::Investigating;
        self.updated_at = at;
        Ok(())
    }

    /// Explicit status change. Entering a terminal status stamps `resolved_at`.
    pub fn update_status(
        &mut self,
        status: CaseStatus,
        resolution_notes: Option<String>,
        actual_loss: Option<Decimal>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if self.status.is_terminal() || status == CaseStatus::Pending {
            return Err(self.transition_error(status));
        }

        self.status = status;
        if resolution_notes.is_some() {
            self.resolution_notes = resolution_notes;
        }
        if actual_loss.is_some() {
            self.actual_loss = actual_loss;
        }
        if status.is_terminal() {
            self.resolved_at = Some(at);
        }
        self.updated_at = at;
        Ok(())
    }
}

/// Append-only note on a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNote {
    pub id: String,
    pub case_number: String,
    pub author: String,
    pub content: String,
    /// Internal notes are not shown to the customer
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl CaseNote {
    pub fn new(
        case_number: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        is_internal: bool,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            case_number: case_number.into(),
            author: author.into(),
            content: content.into(),
            is_internal,
            created_at: at,
        }
    }
}
