//! In-memory fraud store
//!
//! All tables sit behind one lock, which makes case open-if-absent a single
//! critical section.

use super::{AlertFilter, CaseOpen, CaseUpdate, FraudStore, TransactionRecord};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use riskguard_core::{
    Alert, CaseNote, FraudCase, FraudPattern, TransactionEvent, TransactionStatus, TriggeredRule,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    transactions: HashMap<String, TransactionRecord>,
    alerts: HashMap<String, Alert>,
    cases: HashMap<String, FraudCase>,
    notes: HashMap<String, Vec<CaseNote>>,
    patterns: BTreeMap<String, FraudPattern>,
}

/// In-memory store
///
/// Suitable for tests, demos and single-process deployments; data is lost
/// when the process restarts.
#[derive(Debug, Default)]
pub struct InMemoryFraudStore {
    tables: RwLock<Tables>,
}

impl InMemoryFraudStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with patterns
    pub fn with_patterns(patterns: Vec<FraudPattern>) -> Self {
        let tables = Tables {
            patterns: patterns.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..Default::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Number of stored cases
    pub async fn case_count(&self) -> usize {
        self.tables.read().await.cases.len()
    }

    /// Number of stored alerts
    pub async fn alert_count(&self) -> usize {
        self.tables.read().await.alerts.len()
    }
}

/// First free case number: the base, then `-2`, `-3`, ...
fn free_case_number(cases: &HashMap<String, FraudCase>, base: &str) -> String {
    if !cases.contains_key(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !cases.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[async_trait]
impl FraudStore for InMemoryFraudStore {
    async fn insert_transaction(&self, record: TransactionRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        let reference = record.event.reference.clone();
        if tables.transactions.contains_key(&reference) {
            return Err(RuntimeError::Duplicate(format!("transaction {}", reference)));
        }
        tables.transactions.insert(reference, record);
        Ok(())
    }

    async fn get_transaction(&self, reference: &str) -> Result<Option<TransactionRecord>> {
        Ok(self.tables.read().await.transactions.get(reference).cloned())
    }

    async fn remove_pending_transaction(&self, reference: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let pending = tables
            .transactions
            .get(reference)
            .is_some_and(|r| r.status.is_none());
        if pending {
            tables.transactions.remove(reference);
        }
        Ok(pending)
    }

    async fn update_transaction_outcome(
        &self,
        reference: &str,
        status: TransactionStatus,
        fraud_score: f64,
        triggered_rules: Vec<TriggeredRule>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .transactions
            .get_mut(reference)
            .ok_or_else(|| RuntimeError::NotFound(format!("transaction {}", reference)))?;
        record.status = Some(status);
        record.fraud_score = Some(fraud_score);
        record.triggered_rules = triggered_rules;
        Ok(())
    }

    async fn previous_transaction(
        &self,
        subject_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<TransactionEvent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .transactions
            .values()
            .map(|r| &r.event)
            .filter(|e| e.subject_id == subject_id && e.timestamp < before)
            .max_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.reference.cmp(&b.reference))
            })
            .cloned())
    }

    async fn insert_alert_if_absent(&self, alert: Alert) -> Result<(Alert, bool)> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.alerts.get(&alert.id) {
            return Ok((existing.clone(), false));
        }
        tables.alerts.insert(alert.id.clone(), alert.clone());
        Ok((alert, true))
    }

    async fn get_alert(&self, alert_id: &str) -> Result<Option<Alert>> {
        Ok(self.tables.read().await.alerts.get(alert_id).cloned())
    }

    async fn link_alert_case(&self, alert_id: &str, case_number: &str) -> Result<Alert> {
        let mut tables = self.tables.write().await;
        let alert = tables
            .alerts
            .get_mut(alert_id)
            .ok_or_else(|| RuntimeError::NotFound(format!("alert {}", alert_id)))?;
        alert.case_number = Some(case_number.to_string());
        Ok(alert.clone())
    }

    async fn acknowledge_alert(
        &self,
        alert_id: &str,
        acknowledged_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Alert> {
        let mut tables = self.tables.write().await;
        let alert = tables
            .alerts
            .get_mut(alert_id)
            .ok_or_else(|| RuntimeError::NotFound(format!("alert {}", alert_id)))?;
        alert.acknowledge(acknowledged_by, at)?;
        Ok(alert.clone())
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let tables = self.tables.read().await;
        let mut alerts: Vec<Alert> = tables
            .alerts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = filter.limit {
            alerts.truncate(limit);
        }
        Ok(alerts)
    }

    async fn open_case_if_absent(&self, mut case: FraudCase) -> Result<CaseOpen> {
        let mut tables = self.tables.write().await;

        if let Some(active) = tables
            .cases
            .values()
            .find(|c| c.transaction_reference == case.transaction_reference && c.status.is_active())
        {
            return Ok(CaseOpen::AlreadyActive(active.clone()));
        }

        case.case_number = free_case_number(&tables.cases, &case.case_number);
        tables.cases.insert(case.case_number.clone(), case.clone());
        Ok(CaseOpen::Opened(case))
    }

    async fn get_case(&self, case_number: &str) -> Result<Option<FraudCase>> {
        Ok(self.tables.read().await.cases.get(case_number).cloned())
    }

    async fn modify_case(
        &self,
        case_number: &str,
        update: CaseUpdate,
        at: DateTime<Utc>,
    ) -> Result<FraudCase> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .cases
            .get_mut(case_number)
            .ok_or_else(|| RuntimeError::NotFound(format!("case {}", case_number)))?;
        let mut case = slot.clone();
        update.apply_to(&mut case, at)?;
        *slot = case.clone();
        Ok(case)
    }

    async fn cases_for_transaction(&self, reference: &str) -> Result<Vec<FraudCase>> {
        let tables = self.tables.read().await;
        let mut cases: Vec<FraudCase> = tables
            .cases
            .values()
            .filter(|c| c.transaction_reference == reference)
            .cloned()
            .collect();
        cases.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(cases)
    }

    async fn add_note(&self, note: CaseNote) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.cases.contains_key(&note.case_number) {
            return Err(RuntimeError::NotFound(format!("case {}", note.case_number)));
        }
        tables
            .notes
            .entry(note.case_number.clone())
            .or_default()
            .push(note);
        Ok(())
    }

    async fn list_notes(&self, case_number: &str) -> Result<Vec<CaseNote>> {
        Ok(self
            .tables
            .read()
            .await
            .notes
            .get(case_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_pattern(&self, pattern: FraudPattern) -> Result<()> {
        pattern.validate()?;
        self.tables
            .write()
            .await
            .patterns
            .insert(pattern.id.clone(), pattern);
        Ok(())
    }

    async fn get_pattern(&self, pattern_id: &str) -> Result<Option<FraudPattern>> {
        Ok(self.tables.read().await.patterns.get(pattern_id).cloned())
    }

    async fn active_patterns(&self) -> Result<Vec<FraudPattern>> {
        Ok(self
            .tables
            .read()
            .await
            .patterns
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn record_pattern_detection(&self, pattern_id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let pattern = tables
            .patterns
            .get_mut(pattern_id)
            .ok_or_else(|| RuntimeError::NotFound(format!("pattern {}", pattern_id)))?;
        pattern.record_detection(at);
        Ok(())
    }

    async fn record_pattern_feedback(
        &self,
        pattern_id: &str,
        confirmed_fraud: bool,
    ) -> Result<FraudPattern> {
        let mut tables = self.tables.write().await;
        let pattern = tables
            .patterns
            .get_mut(pattern_id)
            .ok_or_else(|| RuntimeError::NotFound(format!("pattern {}", pattern_id)))?;
        pattern.record_feedback(confirmed_fraud);
        Ok(pattern.clone())
    }
}
