//! Unit tests for FraudEngine

use crate::config::ScorerConfig;
use crate::error::SdkError;
use crate::{FraudEngine, FraudEngineBuilder, TransactionRequest};
use chrono::{DateTime, TimeZone, Utc};
use riskguard_core::{
    Alert, CaseNote, CaseStatus, FeatureContribution, FeatureVector, FraudCase, FraudPattern,
    Recommendation, RiskLevel, RuleId, ScoreSource, Severity, TransactionEvent, TransactionStatus,
    TriggeredRule,
};
use riskguard_runtime::storage::{AlertFilter, CaseOpen, CaseUpdate, TransactionRecord};
use riskguard_runtime::{
    FraudStore, InMemoryFraudStore, ModelClient, ModelError, ModelPrediction, RuntimeError,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fails the first `failures` calls, then answers `score`
struct FlakyModel {
    failures: usize,
    score: f64,
    delay: Duration,
    calls: AtomicUsize,
}

impl FlakyModel {
    fn new(failures: usize, score: f64) -> Self {
        Self {
            failures,
            score,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(delay: Duration, score: f64) -> Self {
        Self {
            delay,
            ..Self::new(0, score)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ModelClient for FlakyModel {
    async fn predict(&self, _features: &FeatureVector) -> Result<ModelPrediction, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call < self.failures {
            return Err(ModelError::Status(503));
        }
        Ok(ModelPrediction {
            fraud_score: self.score,
            top_features: (0..7)
                .map(|i| FeatureContribution {
                    feature: format!("f{}", i),
                    importance: 0.7 - i as f64 * 0.1,
                })
                .collect(),
        })
    }
}

/// In-memory store whose alert table is down for the first `failures` inserts
struct AlertOutageStore {
    inner: InMemoryFraudStore,
    failures: usize,
    attempts: AtomicUsize,
}

impl AlertOutageStore {
    fn new(failures: usize) -> Self {
        Self {
            inner: InMemoryFraudStore::new(),
            failures,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl FraudStore for AlertOutageStore {
    async fn insert_transaction(&self, record: TransactionRecord) -> riskguard_runtime::Result<()> {
        self.inner.insert_transaction(record).await
    }

    async fn get_transaction(
        &self,
        reference: &str,
    ) -> riskguard_runtime::Result<Option<TransactionRecord>> {
        self.inner.get_transaction(reference).await
    }

    async fn remove_pending_transaction(&self, reference: &str) -> riskguard_runtime::Result<bool> {
        self.inner.remove_pending_transaction(reference).await
    }

    async fn update_transaction_outcome(
        &self,
        reference: &str,
        status: TransactionStatus,
        fraud_score: f64,
        triggered_rules: Vec<TriggeredRule>,
    ) -> riskguard_runtime::Result<()> {
        self.inner
            .update_transaction_outcome(reference, status, fraud_score, triggered_rules)
            .await
    }

    async fn previous_transaction(
        &self,
        subject_id: &str,
        before: DateTime<Utc>,
    ) -> riskguard_runtime::Result<Option<TransactionEvent>> {
        self.inner.previous_transaction(subject_id, before).await
    }

    async fn insert_alert_if_absent(&self, alert: Alert) -> riskguard_runtime::Result<(Alert, bool)> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(RuntimeError::Storage("alert table offline".to_string()));
        }
        self.inner.insert_alert_if_absent(alert).await
    }

    async fn get_alert(&self, alert_id: &str) -> riskguard_runtime::Result<Option<Alert>> {
        self.inner.get_alert(alert_id).await
    }

    async fn link_alert_case(
        &self,
        alert_id: &str,
        case_number: &str,
    ) -> riskguard_runtime::Result<Alert> {
        self.inner.link_alert_case(alert_id, case_number).await
    }

    async fn acknowledge_alert(
        &self,
        alert_id: &str,
        acknowledged_by: &str,
        at: DateTime<Utc>,
    ) -> riskguard_runtime::Result<Alert> {
        self.inner.acknowledge_alert(alert_id, acknowledged_by, at).await
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> riskguard_runtime::Result<Vec<Alert>> {
        self.inner.list_alerts(filter).await
    }

    async fn open_case_if_absent(&self, case: FraudCase) -> riskguard_runtime::Result<CaseOpen> {
        self.inner.open_case_if_absent(case).await
    }

    async fn get_case(&self, case_number: &str) -> riskguard_runtime::Result<Option<FraudCase>> {
        self.inner.get_case(case_number).await
    }

    async fn modify_case(
        &self,
        case_number: &str,
        update: CaseUpdate,
        at: DateTime<Utc>,
    ) -> riskguard_runtime::Result<FraudCase> {
        self.inner.modify_case(case_number, update, at).await
    }

    async fn cases_for_transaction(
        &self,
        reference: &str,
    ) -> riskguard_runtime::Result<Vec<FraudCase>> {
        self.inner.cases_for_transaction(reference).await
    }

    async fn add_note(&self, note: CaseNote) -> riskguard_runtime::Result<()> {
        self.inner.add_note(note).await
    }

    async fn list_notes(&self, case_number: &str) -> riskguard_runtime::Result<Vec<CaseNote>> {
        self.inner.list_notes(case_number).await
    }

    async fn upsert_pattern(&self, pattern: FraudPattern) -> riskguard_runtime::Result<()> {
        self.inner.upsert_pattern(pattern).await
    }

    async fn get_pattern(&self, pattern_id: &str) -> riskguard_runtime::Result<Option<FraudPattern>> {
        self.inner.get_pattern(pattern_id).await
    }

    async fn active_patterns(&self) -> riskguard_runtime::Result<Vec<FraudPattern>> {
        self.inner.active_patterns().await
    }

    async fn record_pattern_detection(
        &self,
        pattern_id: &str,
        at: DateTime<Utc>,
    ) -> riskguard_runtime::Result<()> {
        self.inner.record_pattern_detection(pattern_id, at).await
    }

    async fn record_pattern_feedback(
        &self,
        pattern_id: &str,
        confirmed_fraud: bool,
    ) -> riskguard_runtime::Result<FraudPattern> {
        self.inner
            .record_pattern_feedback(pattern_id, confirmed_fraud)
            .await
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
}

fn request(subject: &str, amount: i64) -> TransactionRequest {
    TransactionRequest::new(subject, Decimal::from(amount)).with_timestamp(noon())
}

async fn engine_with_model(model: Arc<FlakyModel>, scorer: ScorerConfig) -> FraudEngine {
    FraudEngineBuilder::new()
        .with_model_client(model)
        .with_scorer(scorer)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_score_with_model() {
    let model = Arc::new(FlakyModel::new(0, 0.85));
    let engine = engine_with_model(model.clone(), ScorerConfig::default()).await;

    let response = engine.score(request("user-1", 120)).await.unwrap();

    assert_eq!(response.source, ScoreSource::Model);
    assert!((response.fraud_score - 0.85).abs() < 1e-9);
    assert_eq!(response.risk_level, RiskLevel::Critical);
    assert_eq!(response.recommendation, Recommendation::Reject);
    assert!((response.confidence - 0.7).abs() < 1e-9);
    assert!(response.request_id.starts_with("req_"));
    assert_eq!(model.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_until_model_answers() {
    let model = Arc::new(FlakyModel::new(2, 0.4));
    let engine = engine_with_model(
        model.clone(),
        ScorerConfig::default()
            .with_max_attempts(3)
            .with_retry_backoff_ms(100),
    )
    .await;

    let response = engine.score(request("user-1", 120)).await.unwrap();
    assert_eq!(response.source, ScoreSource::Model);
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn test_single_attempt_falls_back() {
    let model = Arc::new(FlakyModel::new(1, 0.4));
    let engine = engine_with_model(model.clone(), ScorerConfig::default()).await;

    let response = engine.score(request("user-1", 60_000)).await.unwrap();
    assert_eq!(response.source, ScoreSource::Fallback);
    assert_eq!(response.confidence, 0.0);
    assert!((response.fraud_score - 0.3).abs() < 1e-9);
    assert_eq!(model.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_caps_retries() {
    let model = Arc::new(FlakyModel::slow(Duration::from_secs(5), 0.9));
    let engine = FraudEngineBuilder::new()
        .with_model_client(model.clone())
        .with_scorer(ScorerConfig::default().with_max_attempts(3))
        .with_processing_deadline_ms(4_000)
        .build()
        .await
        .unwrap();

    let response = engine.score(request("user-1", 60_000)).await.unwrap();
    assert_eq!(response.source, ScoreSource::Fallback);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_detailed_truncates_explanation() {
    let model = Arc::new(FlakyModel::new(0, 0.2));
    let engine = engine_with_model(model, ScorerConfig::default()).await;

    let detailed = engine
        .score_detailed(request("user-1", 75_000))
        .await
        .unwrap();

    assert_eq!(detailed.explanation.top_features.len(), 5);
    assert_eq!(detailed.explanation.top_features[0].feature, "f0");
    assert_eq!(detailed.triggered_rules.len(), 1);
    assert_eq!(detailed.triggered_rules[0].rule, RuleId::HighAmount);
}

#[tokio::test]
async fn test_fallback_explanation_names_fired_weights() {
    let engine = FraudEngineBuilder::new().build().await.unwrap();
    let detailed = engine
        .score_detailed(request("user-1", 75_000))
        .await
        .unwrap();

    assert_eq!(detailed.score.source, ScoreSource::Fallback);
    assert_eq!(detailed.explanation.top_features[0].feature, "amount");
}

#[tokio::test]
async fn test_invalid_request_rejected_before_scoring() {
    let engine = FraudEngineBuilder::new().build().await.unwrap();

    let err = engine.score(request("user-1", 0)).await.unwrap_err();
    assert!(matches!(err, SdkError::Core(_)));

    let err = engine.score(request("", 10)).await.unwrap_err();
    assert!(err.to_string().contains("subject id"));
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let engine = FraudEngineBuilder::new().build().await.unwrap();
    let requests = vec![
        request("user-1", 10),
        request("user-2", -5),
        request("user-3", 60_000),
    ];

    let batch = engine.score_batch(requests).await.unwrap();

    assert_eq!(batch.total, 3);
    assert_eq!(batch.successful, 2);
    assert_eq!(batch.failed, 1);
    let subjects: Vec<_> = batch.results.iter().map(|r| r.subject_id.as_str()).collect();
    assert_eq!(subjects, vec!["user-1", "user-2", "user-3"]);
    assert!(batch.results[1].error.is_some());
    assert!(batch.results[1].prediction.is_none());
    assert_eq!(
        batch.results[2].prediction.as_ref().map(|p| p.risk_level),
        Some(RiskLevel::Medium)
    );
}

#[tokio::test]
async fn test_batch_size_limits() {
    let engine = FraudEngineBuilder::new().build().await.unwrap();

    assert!(matches!(
        engine.score_batch(vec![]).await,
        Err(SdkError::InvalidInput(_))
    ));

    let too_many = (0..101).map(|i| request(&format!("u{}", i), 10)).collect();
    assert!(matches!(
        engine.score_batch(too_many).await,
        Err(SdkError::InvalidInput(_))
    ));

    let full = (0..100).map(|i| request(&format!("u{}", i), 10)).collect();
    assert_eq!(engine.score_batch(full).await.unwrap().successful, 100);
}

#[tokio::test]
async fn test_process_persists_outcome() {
    let model = Arc::new(FlakyModel::new(0, 0.95));
    let engine = engine_with_model(model, ScorerConfig::default()).await;

    let processed = engine
        .process_transaction(request("user-1", 300).with_reference("TXN-PROC-0001"))
        .await
        .unwrap();

    assert_eq!(processed.status, TransactionStatus::Rejected);
    assert_eq!(processed.alert_id.as_deref(), Some("ALERT-TXN-PROC-0001"));
    let case_number = processed.case_number.clone().unwrap();

    let record = engine.get_transaction("TXN-PROC-0001").await.unwrap().unwrap();
    assert_eq!(record.status, Some(TransactionStatus::Rejected));
    assert_eq!(record.fraud_score, Some(processed.fraud_score));

    let alert = engine.get_alert("ALERT-TXN-PROC-0001").await.unwrap().unwrap();
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.case_number, Some(case_number));
}

#[tokio::test]
async fn test_duplicate_reference_rejected() {
    let engine = FraudEngineBuilder::new().build().await.unwrap();
    engine
        .process_transaction(request("user-1", 10).with_reference("DUP-1"))
        .await
        .unwrap();

    let err = engine
        .process_transaction(request("user-1", 10).with_reference("DUP-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Runtime(RuntimeError::Duplicate(_))));
}

#[tokio::test]
async fn test_failed_processing_can_be_resubmitted() {
    let store = Arc::new(AlertOutageStore::new(1));
    let engine = FraudEngineBuilder::new()
        .with_store(store.clone())
        .with_model_client(Arc::new(FlakyModel::new(0, 0.95)))
        .build()
        .await
        .unwrap();

    let err = engine
        .process_transaction(request("user-1", 300).with_reference("TXN-RETRY-0001"))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Runtime(RuntimeError::Storage(_))));
    assert!(engine.get_transaction("TXN-RETRY-0001").await.unwrap().is_none());

    let processed = engine
        .process_transaction(request("user-1", 300).with_reference("TXN-RETRY-0001"))
        .await
        .unwrap();
    assert_eq!(processed.status, TransactionStatus::Rejected);
    assert_eq!(processed.alert_id.as_deref(), Some("ALERT-TXN-RETRY-0001"));
    assert!(processed.case_number.is_some());

    let record = engine.get_transaction("TXN-RETRY-0001").await.unwrap().unwrap();
    assert_eq!(record.status, Some(TransactionStatus::Rejected));
}

#[tokio::test]
async fn test_case_operations() {
    let model = Arc::new(FlakyModel::new(0, 0.95));
    let engine = engine_with_model(model, ScorerConfig::default()).await;
    let processed = engine
        .process_transaction(request("user-1", 300).with_reference("TXN-CASE-0001"))
        .await
        .unwrap();
    let number = processed.case_number.unwrap();

    let case = engine.assign_case(&number, "analyst-1").await.unwrap();
    assert_eq!(case.status, CaseStatus::Investigating);

    engine
        .add_case_note(&number, "analyst-1", "customer confirmed card stolen", true)
        .await
        .unwrap();
    let case = engine
        .update_case_status(&number, CaseStatus::Confirmed, None, Some(Decimal::from(300)))
        .await
        .unwrap();
    assert!(case.resolved_at.is_some());

    let view = engine.get_case(&number).await.unwrap();
    assert_eq!(view.case.status, CaseStatus::Confirmed);
    assert_eq!(view.notes.len(), 1);

    let err = engine.assign_case(&number, "analyst-2").await.unwrap_err();
    assert!(err.to_string().contains("CONFIRMED -> INVESTIGATING"));

    let alert = engine
        .acknowledge_alert("ALERT-TXN-CASE-0001", "analyst-1")
        .await
        .unwrap();
    assert!(alert.acknowledged);
}

#[tokio::test]
async fn test_metrics_recorded() {
    let engine = FraudEngineBuilder::new().build().await.unwrap();
    engine
        .process_transaction(request("user-1", 60_000))
        .await
        .unwrap();

    let metrics = engine.metrics().unwrap();
    assert_eq!(metrics.counter_value("transactions_processed"), 1);
    assert_eq!(metrics.counter_value("scorer_fallbacks"), 1);
    assert_eq!(metrics.counter_value("alerts_created"), 1);
}
