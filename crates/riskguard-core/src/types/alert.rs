//! Alerts raised for suspicious transactions

use super::rule::TriggeredRule;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// HIGH and CRITICAL alerts are eligible for a case
    pub fn warrants_case(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// An alert attached to exactly one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// `ALERT-{transaction reference}`
    pub id: String,
    pub transaction_reference: String,
    pub subject_id: String,
    pub severity: Severity,
    pub message: String,
    pub triggered_rules: Vec<TriggeredRule>,
    pub fraud_score: f64,
    pub amount: Decimal,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Case opened for this alert, if any
    pub case_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Deterministic alert id for a transaction
    pub fn id_for(reference: &str) -> String {
        format!("ALERT-{}", reference)
    }

    pub fn message_for(fraud_score: f64) -> String {
        format!(
            "Suspicious transaction detected with fraud score {:.2}",
            fraud_score
        )
    }

    pub fn acknowledge(&mut self, by: impl Into<String>, at: DateTime<Utc>) -> Result<()> {
        if self.acknowledged {
            return Err(CoreError::AlreadyAcknowledged(self.id.clone()));
        }
        self.acknowledged = true;
        self.acknowledged_by = Some(by.into());
        self.acknowledged_at = Some(at);
        Ok(())
    }

    /// Unacknowledged, case-worthy, unlinked and at least `min_age` old
    pub fn needs_escalation(&self, now: DateTime<Utc>, min_age: Duration) -> bool {
        !self.acknowledged
            && self.case_number.is_none()
            && self.severity.warrants_case()
            && self.created_at <= now - min_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(severity: Severity, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id: Alert::id_for("TXN1"),
            transaction_reference: "TXN1".to_string(),
            subject_id: "user-1".to_string(),
            severity,
            message: Alert::message_for(0.72),
            triggered_rules: vec![],
            fraud_score: 0.72,
            amount: Decimal::from(100),
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            case_number: None,
            created_at,
        }
    }

    #[test]
    fn test_alert_id_and_message() {
        assert_eq!(Alert::id_for("TXN42"), "ALERT-TXN42");
        assert_eq!(
            Alert::message_for(0.456),
            "Suspicious transaction detected with fraud score 0.46"
        );
    }

    #[test]
    fn test_acknowledge_once() {
        let now = Utc::now();
        let mut alert = alert(Severity::High, now);

        alert.acknowledge("analyst-7", now).unwrap();
        assert!(alert.acknowledged);
        assert_eq!(alert.acknowledged_by.as_deref(), Some("analyst-7"));

        let err = alert.acknowledge("analyst-8", now).unwrap_err();
        assert_eq!(err, CoreError::AlreadyAcknowledged("ALERT-TXN1".to_string()));
        assert_eq!(alert.acknowledged_by.as_deref(), Some("analyst-7"));
    }

    #[test]
    fn test_needs_escalation() {
        let now = Utc::now();
        let window = Duration::minutes(30);

        assert!(alert(Severity::High, now - Duration::minutes(31)).needs_escalation(now, window));
        assert!(!alert(Severity::High, now - Duration::minutes(5)).needs_escalation(now, window));
        assert!(!alert(Severity::Medium, now - Duration::hours(2)).needs_escalation(now, window));

        let mut linked = alert(Severity::Critical, now - Duration::hours(2));
        linked.case_number = Some("CASE-1".to_string());
        assert!(!linked.needs_escalation(now, window));

        let mut acked = alert(Severity::Critical, now - Duration::hours(2));
        acked.acknowledge("analyst", now).unwrap();
        assert!(!acked.needs_escalation(now, window));
    }
}
