//! Alert and case escalation
//!
//! [`EscalationPolicy::decide`] is pure: it maps a score and the triggered
//! rules to a severity and to the intents "create alert" and "open case".
//! [`Escalator`] applies those intents against storage. Alert creation is
//! idempotent per transaction, and a case is only opened through the store's
//! atomic open-if-absent, so concurrent or repeated scoring of a transaction
//! never yields two active cases.

use crate::error::Result;
use crate::observability::{
    Metrics, MetricsCollector, ALERTS_CREATED, CASES_OPENED, RESCAN_ESCALATIONS,
};
use crate::storage::{AlertFilter, CaseOpen, FraudStore};
use chrono::{DateTime, Duration, Utc};
use riskguard_core::{Alert, FraudCase, ScoreResult, Severity, TransactionEvent, TriggeredRule};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Severity and escalation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationPolicy {
    /// Scores at or above this always raise an alert
    pub alert_threshold: f64,
    /// Transactions scoring at or above this are rejected
    pub reject_threshold: f64,
    pub critical_score: f64,
    pub critical_rule_count: usize,
    pub high_score: f64,
    pub high_rule_count: usize,
    pub medium_score: f64,
    /// Minimum age of an unacknowledged alert before the rescan opens a case
    pub rescan_min_age_minutes: i64,
    /// Alerts examined per rescan pass
    pub rescan_limit: usize,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            alert_threshold: 0.5,
            reject_threshold: 0.8,
            critical_score: 0.9,
            critical_rule_count: 3,
            high_score: 0.7,
            high_rule_count: 2,
            medium_score: 0.5,
            rescan_min_age_minutes: 30,
            rescan_limit: 50,
        }
    }
}

/// Intents produced for one scored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationDecision {
    pub severity: Severity,
    pub create_alert: bool,
    pub open_case: bool,
}

impl EscalationPolicy {
    pub fn severity(&self, fraud_score: f64, rule_count: usize) -> Severity {
        if fraud_score >= self.critical_score || rule_count >= self.critical_rule_count {
            Severity::Critical
        } else if fraud_score >= self.high_score || rule_count >= self.high_rule_count {
            Severity::High
        } else if fraud_score >= self.medium_score {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn decide(&self, fraud_score: f64, rules: &[TriggeredRule]) -> EscalationDecision {
        let severity = self.severity(fraud_score, rules.len());
        let create_alert = fraud_score >= self.alert_threshold || !rules.is_empty();
        EscalationDecision {
            severity,
            create_alert,
            open_case: create_alert && severity.warrants_case(),
        }
    }

    pub fn rescan_min_age(&self) -> Duration {
        Duration::minutes(self.rescan_min_age_minutes)
    }
}

/// What `apply` did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EscalationOutcome {
    /// The transaction's alert, new or pre-existing
    pub alert: Option<Alert>,
    pub alert_created: bool,
    /// The transaction's active case, new or pre-existing
    pub case: Option<FraudCase>,
    pub case_opened: bool,
}

/// Applies escalation intents against storage
pub struct Escalator {
    policy: EscalationPolicy,
    store: Arc<dyn FraudStore>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Escalator {
    pub fn new(policy: EscalationPolicy, store: Arc<dyn FraudStore>) -> Self {
        Self {
            policy,
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    fn count(&self, name: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.counter(name).inc();
        }
    }

    /// Decide and apply in one step
    pub async fn escalate(
        &self,
        event: &TransactionEvent,
        score: &ScoreResult,
        rules: &[TriggeredRule],
        now: DateTime<Utc>,
    ) -> Result<EscalationOutcome> {
        let decision = self.policy.decide(score.fraud_score, rules);
        self.apply(event, score, rules, decision, now).await
    }

    /// Carry out a decision.
    ///
    /// A failed case open is logged and left to the rescan; the alert stays.
    pub async fn apply(
        &self,
        event: &TransactionEvent,
        score: &ScoreResult,
        rules: &[TriggeredRule],
        decision: EscalationDecision,
        now: DateTime<Utc>,
    ) -> Result<EscalationOutcome> {
        if !decision.create_alert {
            return Ok(EscalationOutcome::default());
        }

        let alert = Alert {
            id: Alert::id_for(&event.reference),
            transaction_reference: event.reference.clone(),
            subject_id: event.subject_id.clone(),
            severity: decision.severity,
            message: Alert::message_for(score.fraud_score),
            triggered_rules: rules.to_vec(),
            fraud_score: score.fraud_score,
            amount: event.amount,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            case_number: None,
            created_at: now,
        };

        let (alert, alert_created) = self.store.insert_alert_if_absent(alert).await?;
        if alert_created {
            self.count(ALERTS_CREATED);
            info!(
                alert_id = %alert.id,
                severity = alert.severity.as_str(),
                fraud_score = alert.fraud_score,
                "alert created"
            );
        }

        let mut outcome = EscalationOutcome {
            alert: Some(alert),
            alert_created,
            case: None,
            case_opened: false,
        };

        if !decision.open_case {
            return Ok(outcome);
        }

        let Some(alert) = outcome.alert.take() else {
            return Ok(outcome);
        };
        match self.open_case_for(alert.clone(), now).await {
            Ok((open, linked)) => {
                outcome.case_opened = open.is_opened();
                if outcome.case_opened {
                    self.count(CASES_OPENED);
                }
                outcome.case = Some(open.case().clone());
                outcome.alert = Some(linked);
            }
            Err(e) => {
                error!(
                    alert_id = %alert.id,
                    error = %e,
                    "failed to open case, leaving alert for rescan"
                );
                outcome.alert = Some(alert);
            }
        }
        Ok(outcome)
    }

    /// Open (or find) the active case for an alert and link the alert to it
    async fn open_case_for(&self, alert: Alert, now: DateTime<Utc>) -> Result<(CaseOpen, Alert)> {
        let open = self
            .store
            .open_case_if_absent(FraudCase::open(&alert, now))
            .await?;

        let case_number = &open.case().case_number;
        if open.is_opened() {
            info!(
                case_number = %case_number,
                reference = %alert.transaction_reference,
                "case opened"
            );
        }
        let alert = if alert.case_number.as_deref() == Some(case_number.as_str()) {
            alert
        } else {
            self.store.link_alert_case(&alert.id, case_number).await?
        };
        Ok((open, alert))
    }

    /// Open cases for overdue HIGH/CRITICAL alerts that were never escalated.
    /// Returns the cases opened by this pass.
    pub async fn rescan(&self, now: DateTime<Utc>) -> Result<Vec<FraudCase>> {
        let filter = AlertFilter::escalation_candidates(
            now - self.policy.rescan_min_age(),
            self.policy.rescan_limit,
        );
        let candidates = self.store.list_alerts(&filter).await?;

        let mut opened = Vec::new();
        for alert in candidates {
            if !alert.needs_escalation(now, self.policy.rescan_min_age()) {
                continue;
            }
            let alert_id = alert.id.clone();
            match self.open_case_for(alert, now).await {
                Ok((CaseOpen::Opened(case), _)) => {
                    self.count(RESCAN_ESCALATIONS);
                    opened.push(case);
                }
                Ok((CaseOpen::AlreadyActive(_), _)) => {}
                Err(e) => error!(alert_id = %alert_id, error = %e, "rescan failed to escalate alert"),
            }
        }

        if !opened.is_empty() {
            info!(count = opened.len(), "escalation rescan opened cases");
        }
        Ok(opened)
    }
}
