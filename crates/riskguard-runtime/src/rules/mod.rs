//! Rule engine
//!
//! Deterministic fraud rules evaluated independently of the model score, in
//! a fixed order: high amount, high velocity, location change, unusual time,
//! then one entry per matching fraud pattern (ascending pattern id).

pub mod patterns;

pub use patterns::{load_patterns_file, parse_patterns};

use crate::error::Result;
use crate::observability::{Metrics, MetricsCollector, PATTERN_DETECTIONS};
use crate::storage::FraudStore;
use chrono::{Duration, Timelike, Utc};
use riskguard_core::{FeatureVector, FraudPattern, RuleId, TransactionEvent, TriggeredRule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tunables for the built-in rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Amounts above this trigger `high_amount`
    pub max_amount: Decimal,

    /// More than this many transactions in the last hour (current included)
    /// trigger `high_velocity`
    pub velocity_limit: u64,

    /// Country changes faster than this trigger `location_change`
    pub location_window_minutes: i64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            max_amount: Decimal::from(50_000),
            velocity_limit: 10,
            location_window_minutes: 120,
        }
    }
}

fn is_unusual_hour(hour: u32) -> bool {
    hour < 6 || hour > 23
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Evaluates built-in rules and fraud patterns
pub struct RuleEngine {
    settings: RuleSettings,
    store: Arc<dyn FraudStore>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RuleEngine {
    pub fn new(settings: RuleSettings, store: Arc<dyn FraudStore>) -> Self {
        Self {
            settings,
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Evaluate against explicit context. Pure: same inputs, same output.
    pub fn evaluate_with(
        &self,
        event: &TransactionEvent,
        features: &FeatureVector,
        previous: Option<&TransactionEvent>,
        patterns: &[FraudPattern],
    ) -> Vec<TriggeredRule> {
        let mut triggered = Vec::new();

        if event.amount > self.settings.max_amount {
            triggered.push(TriggeredRule::new(
                RuleId::HighAmount,
                format!(
                    "Transaction amount {} exceeds limit {}",
                    event.amount, self.settings.max_amount
                ),
            ));
        }

        // the feature counts prior transactions only
        let count = features.txn_count_1h.max(0.0) as u64 + 1;
        if count > self.settings.velocity_limit {
            triggered.push(TriggeredRule::new(
                RuleId::HighVelocity,
                format!("{} transactions in last hour", count),
            ));
        }

        if let Some(rule) = previous.and_then(|p| self.location_change(p, event)) {
            triggered.push(rule);
        }

        let hour = event.timestamp.hour();
        if is_unusual_hour(hour) {
            triggered.push(TriggeredRule::new(
                RuleId::UnusualTime,
                format!("Transaction at unusual hour: {}:00", hour),
            ));
        }

        let mut ordered: Vec<&FraudPattern> = patterns.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        for pattern in ordered.into_iter().filter(|p| p.matches(event)) {
            triggered.push(TriggeredRule::pattern(
                pattern.id.clone(),
                format!("Matches fraud pattern: {}", pattern.name),
            ));
        }

        triggered
    }

    fn location_change(
        &self,
        previous: &TransactionEvent,
        current: &TransactionEvent,
    ) -> Option<TriggeredRule> {
        let from = present(previous.country.as_deref())?;
        let to = present(current.country.as_deref())?;
        if from.eq_ignore_ascii_case(to) || previous.timestamp >= current.timestamp {
            return None;
        }

        let gap = current.timestamp - previous.timestamp;
        if gap >= Duration::minutes(self.settings.location_window_minutes) {
            return None;
        }

        let hours = gap.num_seconds() as f64 / 3600.0;
        Some(TriggeredRule::new(
            RuleId::LocationChange,
            format!("Location changed from {} to {} in {:.1} hours", from, to, hours),
        ))
    }

    /// Load context from storage, evaluate, and count pattern detections
    pub async fn evaluate(
        &self,
        event: &TransactionEvent,
        features: &FeatureVector,
    ) -> Result<Vec<TriggeredRule>> {
        let previous = self
            .store
            .previous_transaction(&event.subject_id, event.timestamp)
            .await?;
        let patterns = self.store.active_patterns().await?;

        let triggered = self.evaluate_with(event, features, previous.as_ref(), &patterns);

        let now = Utc::now();
        for pattern_id in triggered.iter().filter_map(|r| r.pattern_id.as_deref()) {
            match self.store.record_pattern_detection(pattern_id, now).await {
                Ok(()) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.counter(PATTERN_DETECTIONS).inc();
                    }
                }
                Err(e) => warn!(pattern = pattern_id, error = %e, "failed to count pattern detection"),
            }
        }

        debug!(
            reference = %event.reference,
            triggered = triggered.len(),
            "rules evaluated"
        );
        Ok(triggered)
    }
}
