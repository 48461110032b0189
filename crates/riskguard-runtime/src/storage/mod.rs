//! Storage layer for transactions, alerts, cases and patterns
//!
//! The engine only talks to storage through [`FraudStore`]. Implementations
//! must make [`FraudStore::open_case_if_absent`] a single atomic
//! compare-and-set against the case table. Alert and case mutations are
//! targeted operations applied against the stored row, never a write-back of
//! a copy read earlier.

mod memory;

pub use memory::InMemoryFraudStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use riskguard_core::{
    Alert, CaseNote, CaseStatus, FraudCase, FraudPattern, Severity, TransactionEvent,
    TransactionStatus, TriggeredRule,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored transaction and its scoring outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub event: TransactionEvent,
    pub status: Option<TransactionStatus>,
    pub fraud_score: Option<f64>,
    #[serde(default)]
    pub triggered_rules: Vec<TriggeredRule>,
}

impl TransactionRecord {
    /// Record for an event that has not been scored yet
    pub fn pending(event: TransactionEvent) -> Self {
        Self {
            event,
            status: None,
            fraud_score: None,
            triggered_rules: Vec::new(),
        }
    }
}

/// Result of an open-if-absent case attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CaseOpen {
    /// The case was inserted
    Opened(FraudCase),
    /// An active case already exists for the transaction; nothing was written
    AlreadyActive(FraudCase),
}

impl CaseOpen {
    pub fn case(&self) -> &FraudCase {
        match self {
            CaseOpen::Opened(c) | CaseOpen::AlreadyActive(c) => c,
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, CaseOpen::Opened(_))
    }
}

/// Analyst change to a case, applied by the store under its own lock
#[derive(Debug, Clone, PartialEq)]
pub enum CaseUpdate {
    Assign {
        assignee: String,
    },
    Status {
        status: CaseStatus,
        resolution_notes: Option<String>,
        actual_loss: Option<Decimal>,
    },
}

impl CaseUpdate {
    /// Run the lifecycle transition on `case`
    pub fn apply_to(
        self,
        case: &mut FraudCase,
        at: DateTime<Utc>,
    ) -> riskguard_core::error::Result<()> {
        match self {
            CaseUpdate::Assign { assignee } => case.assign(assignee, at),
            CaseUpdate::Status {
                status,
                resolution_notes,
                actual_loss,
            } => case.update_status(status, resolution_notes, actual_loss, at),
        }
    }
}

/// Filter for alert queries
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// Only these severities (empty means any)
    pub severities: Vec<Severity>,
    pub acknowledged: Option<bool>,
    pub has_case: Option<bool>,
    /// Only alerts created at or before this instant
    pub created_before: Option<DateTime<Utc>>,
    pub subject_id: Option<String>,
    pub limit: Option<usize>,
}

impl AlertFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Unacknowledged HIGH/CRITICAL alerts without a case, created at or
    /// before `cutoff`
    pub fn escalation_candidates(cutoff: DateTime<Utc>, limit: usize) -> Self {
        Self {
            severities: vec![Severity::High, Severity::Critical],
            acknowledged: Some(false),
            has_case: Some(false),
            created_before: Some(cutoff),
            subject_id: None,
            limit: Some(limit),
        }
    }

    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if an alert matches this filter (ignores `limit`)
    pub fn matches(&self, alert: &Alert) -> bool {
        if !self.severities.is_empty() && !self.severities.contains(&alert.severity) {
            return false;
        }
        if let Some(acknowledged) = self.acknowledged {
            if alert.acknowledged != acknowledged {
                return false;
            }
        }
        if let Some(has_case) = self.has_case {
            if alert.case_number.is_some() != has_case {
                return false;
            }
        }
        if let Some(cutoff) = self.created_before {
            if alert.created_at > cutoff {
                return false;
            }
        }
        if let Some(subject) = &self.subject_id {
            if &alert.subject_id != subject {
                return false;
            }
        }
        true
    }
}

/// Persistence collaborator
#[async_trait]
pub trait FraudStore: Send + Sync {
    // ---- transactions ----

    /// Insert a new transaction. Fails with `Duplicate` if the reference exists.
    async fn insert_transaction(&self, record: TransactionRecord) -> Result<()>;

    async fn get_transaction(&self, reference: &str) -> Result<Option<TransactionRecord>>;

    /// Drop a transaction that never received an outcome so the reference can
    /// be submitted again. Scored transactions are kept; returns whether a
    /// record was removed.
    async fn remove_pending_transaction(&self, reference: &str) -> Result<bool>;

    /// Store the scoring outcome of a transaction
    async fn update_transaction_outcome(
        &self,
        reference: &str,
        status: TransactionStatus,
        fraud_score: f64,
        triggered_rules: Vec<TriggeredRule>,
    ) -> Result<()>;

    /// Latest transaction of `subject` with a timestamp strictly before `before`
    async fn previous_transaction(
        &self,
        subject_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<TransactionEvent>>;

    // ---- alerts ----

    /// Insert the alert unless one with the same id exists. Returns the
    /// stored alert and whether it was created.
    async fn insert_alert_if_absent(&self, alert: Alert) -> Result<(Alert, bool)>;

    async fn get_alert(&self, alert_id: &str) -> Result<Option<Alert>>;

    /// Point the alert at `case_number`, leaving every other field as stored
    async fn link_alert_case(&self, alert_id: &str, case_number: &str) -> Result<Alert>;

    /// Acknowledge the stored alert. Fails with `AlreadyAcknowledged` if an
    /// acknowledgement is already recorded.
    async fn acknowledge_alert(
        &self,
        alert_id: &str,
        acknowledged_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Alert>;

    /// Alerts matching the filter, newest first
    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;

    // ---- cases ----

    /// Insert `case` unless its transaction already has an active case
    async fn open_case_if_absent(&self, case: FraudCase) -> Result<CaseOpen>;

    async fn get_case(&self, case_number: &str) -> Result<Option<FraudCase>>;

    /// Apply `update` to the stored case and return the result. A rejected
    /// transition leaves the stored case untouched.
    async fn modify_case(
        &self,
        case_number: &str,
        update: CaseUpdate,
        at: DateTime<Utc>,
    ) -> Result<FraudCase>;

    async fn cases_for_transaction(&self, reference: &str) -> Result<Vec<FraudCase>>;

    async fn add_note(&self, note: CaseNote) -> Result<()>;

    async fn list_notes(&self, case_number: &str) -> Result<Vec<CaseNote>>;

    // ---- patterns ----

    async fn upsert_pattern(&self, pattern: FraudPattern) -> Result<()>;

    async fn get_pattern(&self, pattern_id: &str) -> Result<Option<FraudPattern>>;

    /// Active patterns ordered by id
    async fn active_patterns(&self) -> Result<Vec<FraudPattern>>;

    async fn record_pattern_detection(&self, pattern_id: &str, at: DateTime<Utc>) -> Result<()>;

    async fn record_pattern_feedback(
        &self,
        pattern_id: &str,
        confirmed_fraud: bool,
    ) -> Result<FraudPattern>;
}
