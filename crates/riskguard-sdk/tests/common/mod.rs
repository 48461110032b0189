//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use riskguard_sdk::{
    FraudEngine, FraudEngineBuilder, InMemoryFraudStore, ScorerConfig, TransactionRequest,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Engine plus direct access to its storage
pub struct TestEngine {
    pub engine: FraudEngine,
    pub store: Arc<InMemoryFraudStore>,
}

impl TestEngine {
    /// Heuristic-only engine over a fresh in-memory store
    pub async fn new() -> Self {
        Self::with_builder(FraudEngineBuilder::new()).await
    }

    /// Engine whose model is unreachable (connection refused)
    pub async fn with_unreachable_model() -> Self {
        Self::with_builder(FraudEngineBuilder::new().with_scorer(
            ScorerConfig::default()
                .with_base_url("http://127.0.0.1:1")
                .with_timeout_ms(500),
        ))
        .await
    }

    pub async fn with_builder(builder: FraudEngineBuilder) -> Self {
        let store = Arc::new(InMemoryFraudStore::new());
        let engine = builder.with_store(store.clone()).build().await.unwrap();
        Self { engine, store }
    }
}

/// A weekday at noon, clear of the unusual-hour rule
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
}

pub fn minutes_after(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

/// Transaction for `subject` at `at`
pub fn txn(subject: &str, amount: i64, at: DateTime<Utc>) -> TransactionRequest {
    TransactionRequest::new(subject, Decimal::from(amount)).with_timestamp(at)
}
