//! Feature extractor
//!
//! `record_and_extract` is not pure: it increments the subject's velocity
//! counters. Call it exactly once per transaction. Counter windows are keyed
//! on the event time, capped at the wall clock so a future-dated event cannot
//! stretch a window.

use super::encoding;
use super::reputation::ReputationTable;
use crate::observability::{Metrics, MetricsCollector, VELOCITY_DEGRADED};
use crate::velocity::{VelocitySnapshot, VelocityStore, VelocityWindow};
use chrono::{DateTime, Datelike, Utc};
use riskguard_core::{FeatureVector, TransactionEvent};
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Builds feature vectors and records velocity
pub struct FeatureExtractor {
    velocity: Arc<dyn VelocityStore>,
    reputation: Arc<ReputationTable>,
    high_risk_countries: HashSet<String>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl FeatureExtractor {
    /// Create a new extractor over a velocity store
    pub fn new(velocity: Arc<dyn VelocityStore>) -> Self {
        Self {
            velocity,
            reputation: Arc::new(ReputationTable::new()),
            high_risk_countries: HashSet::new(),
            metrics: None,
        }
    }

    pub fn with_reputation(mut self, reputation: Arc<ReputationTable>) -> Self {
        self.reputation = reputation;
        self
    }

    pub fn with_high_risk_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.high_risk_countries = countries
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_uppercase())
            .collect();
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn reputation(&self) -> &Arc<ReputationTable> {
        &self.reputation
    }

    /// Record the transaction in the velocity counters and derive its features.
    ///
    /// Never fails: an unavailable counter store yields zero velocity and a
    /// non-foreign flag.
    pub async fn record_and_extract(&self, event: &TransactionEvent) -> FeatureVector {
        let amount = event.amount.to_f64().unwrap_or(0.0);
        let at = event.timestamp;
        let hour = encoding::hour_of(at);

        let one_hour = self.record_window(event, VelocityWindow::OneHour).await;
        let one_day = self.record_window(event, VelocityWindow::TwentyFourHours).await;
        let txn_amount_24h = one_day.amount.to_f64().unwrap_or(0.0);

        FeatureVector {
            amount,
            log_amount: encoding::log_amount(amount),
            amount_bin: encoding::amount_bin(amount) as f64,
            hour: hour as f64,
            day_of_week: at.weekday().num_days_from_monday() as f64,
            is_weekend: flag(encoding::is_weekend(at)),
            is_night: flag(encoding::is_night(hour)),
            day_of_month: at.day() as f64,
            txn_count_1h: one_hour.count as f64,
            txn_amount_1h: one_hour.amount.to_f64().unwrap_or(0.0),
            txn_count_24h: one_day.count as f64,
            txn_amount_24h,
            avg_txn_amount_24h: txn_amount_24h / (one_day.count.max(1) as f64),
            merchant_category_encoded: encoding::encode_merchant_category(
                event.merchant_category.as_deref(),
            ) as f64,
            merchant_risk_score: self.reputation.merchant_risk(event.merchant_id.as_deref()),
            country_encoded: encoding::encode_country(
                event.country.as_deref(),
                &self.high_risk_countries,
            ) as f64,
            is_foreign_transaction: flag(self.is_foreign(event).await),
            device_risk_score: self.reputation.device_risk(event.device_id.as_deref()),
            transaction_type_encoded: encoding::encode_transaction_type(&event.transaction_type)
                as f64,
        }
    }

    async fn record_window(
        &self,
        event: &TransactionEvent,
        window: VelocityWindow,
    ) -> VelocitySnapshot {
        match self
            .velocity
            .increment_and_read(&event.subject_id, window, event.amount, window_clock(event))
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    subject = %event.subject_id,
                    window = window.suffix(),
                    error = %e,
                    "velocity store unavailable, scoring with zero velocity"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.counter(VELOCITY_DEGRADED).inc();
                }
                VelocitySnapshot::default()
            }
        }
    }

    /// The first country seen for a subject is home and never foreign
    async fn is_foreign(&self, event: &TransactionEvent) -> bool {
        let Some(country) = event.country.as_deref().map(str::trim).filter(|c| !c.is_empty())
        else {
            return false;
        };

        match self
            .velocity
            .seed_home_country(&event.subject_id, country, window_clock(event))
            .await
        {
            Ok(home) => !home.eq_ignore_ascii_case(country),
            Err(e) => {
                warn!(
                    subject = %event.subject_id,
                    error = %e,
                    "home country lookup failed, treating as domestic"
                );
                false
            }
        }
    }
}

fn window_clock(event: &TransactionEvent) -> DateTime<Utc> {
    event.timestamp.min(Utc::now())
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
