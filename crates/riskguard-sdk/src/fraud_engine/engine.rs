//! Core FraudEngine implementation

use super::types::{
    BatchItemResult, BatchScoreResponse, CaseView, DetailedScoreResponse, Explanation,
    FeatureInfo, ProcessedTransaction, ScoreResponse, TransactionRequest, MAX_BATCH_SIZE,
    TOP_FEATURES,
};
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use riskguard_core::{
    Alert, CaseNote, CaseStatus, FeatureVector, FraudCase, FraudPattern, RiskLevel, ScoreResult,
    TransactionEvent, TransactionStatus,
};
use riskguard_runtime::observability::{Metrics, SCORING, TRANSACTIONS_PROCESSED};
use riskguard_runtime::storage::TransactionRecord;
use riskguard_runtime::{
    CaseService, Escalator, FeatureExtractor, FraudStore, MetricsCollector, ModelOutcome,
    ReputationTable, RiskScorer, RuleEngine,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub struct FraudEngine {
    /// Configuration
    config: EngineConfig,

    /// Transactions, alerts, cases and patterns
    store: Arc<dyn FraudStore>,

    extractor: FeatureExtractor,

    scorer: RiskScorer,

    rules: RuleEngine,

    escalator: Escalator,

    cases: CaseService,

    /// Metrics collector, absent when metrics are disabled
    metrics: Option<Arc<MetricsCollector>>,
}

impl FraudEngine {
    /// Generate a unique request ID
    /// Format: req_YYYYMMDDHHmmss_xxxxxx
    /// Example: req_20231209143052_a3f2e1
    fn generate_request_id() -> String {
        use rand::Rng;

        let datetime_str = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let random: u32 = rand::thread_rng().gen_range(0..0xFFFFFF);

        format!("req_{}_{:06x}", datetime_str, random)
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        store: Arc<dyn FraudStore>,
        extractor: FeatureExtractor,
        scorer: RiskScorer,
        rules: RuleEngine,
        escalator: Escalator,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            cases: CaseService::new(store.clone()),
            config,
            store,
            extractor,
            scorer,
            rules,
            escalator,
            metrics,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&Arc<MetricsCollector>> {
        self.metrics.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn FraudStore> {
        &self.store
    }

    /// Merchant and device risk table used by feature extraction
    pub fn reputation(&self) -> &Arc<ReputationTable> {
        self.extractor.reputation()
    }

    pub fn feature_info(&self) -> FeatureInfo {
        FeatureInfo::new(self.scorer.model_version(), self.scorer.has_model())
    }

    /// Score with model retries inside the processing deadline, falling back
    /// when the model never answers in time
    async fn score_features(&self, features: &FeatureVector, started: Instant) -> ScoreResult {
        if !self.scorer.has_model() {
            return self.scorer.fallback(features);
        }

        let deadline = started + self.config.processing_deadline();
        let attempts = self.config.scorer.attempts();
        let mut outcome = ModelOutcome::TimedOut;

        for attempt in 1..=attempts {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            outcome = self.scorer.call_model(features, Some(remaining)).await;
            if matches!(outcome, ModelOutcome::Scored(_)) || attempt == attempts {
                break;
            }

            let backoff = self.config.scorer.backoff(attempt);
            if Instant::now() + backoff >= deadline {
                break;
            }
            debug!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying model call");
            tokio::time::sleep(backoff).await;
        }

        self.scorer.resolve(outcome, features)
    }

    fn score_response(
        &self,
        request_id: String,
        result: &ScoreResult,
        started: Instant,
    ) -> ScoreResponse {
        let risk_level = RiskLevel::from_score(result.fraud_score, &self.config.thresholds);
        ScoreResponse {
            request_id,
            fraud_score: result.fraud_score,
            risk_level,
            confidence: result.confidence,
            recommendation: risk_level.recommendation(),
            model_version: result.model_version.clone(),
            source: result.source,
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            timestamp: result.computed_at,
        }
    }

    fn record_latency(&self, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_execution_time(SCORING, started.elapsed());
        }
    }

    /// Score a single transaction. Velocity counters are updated; nothing
    /// else is persisted.
    pub async fn score(&self, request: TransactionRequest) -> Result<ScoreResponse> {
        let started = Instant::now();
        let request_id = Self::generate_request_id();
        let event = request.into_event(Utc::now())?;

        let features = self.extractor.record_and_extract(&event).await;
        let result = self.score_features(&features, started).await;
        let response = self.score_response(request_id, &result, started);

        self.record_latency(started);
        info!(
            request_id = %response.request_id,
            subject_id = %event.subject_id,
            fraud_score = response.fraud_score,
            risk_level = response.risk_level.as_str(),
            "transaction scored"
        );
        Ok(response)
    }

    /// Score with explanation and triggered rules
    pub async fn score_detailed(&self, request: TransactionRequest) -> Result<DetailedScoreResponse> {
        let started = Instant::now();
        let request_id = Self::generate_request_id();
        let event = request.into_event(Utc::now())?;

        let features = self.extractor.record_and_extract(&event).await;
        let (result, triggered_rules) = tokio::join!(
            self.score_features(&features, started),
            self.rules.evaluate(&event, &features)
        );
        let triggered_rules = triggered_rules?;

        let mut top_features = result.top_features.clone();
        top_features.truncate(TOP_FEATURES);
        let score = self.score_response(request_id, &result, started);

        self.record_latency(started);
        info!(
            request_id = %score.request_id,
            subject_id = %event.subject_id,
            fraud_score = score.fraud_score,
            triggered = triggered_rules.len(),
            "transaction scored with explanation"
        );
        Ok(DetailedScoreResponse {
            score,
            explanation: Explanation { top_features },
            triggered_rules,
        })
    }

    /// Score 1..=100 transactions. Items run concurrently; results keep the
    /// input order and one failing item does not fail the batch.
    pub async fn score_batch(&self, requests: Vec<TransactionRequest>) -> Result<BatchScoreResponse> {
        if requests.is_empty() || requests.len() > MAX_BATCH_SIZE {
            return Err(SdkError::InvalidInput(format!(
                "batch must contain 1..={} transactions, got {}",
                MAX_BATCH_SIZE,
                requests.len()
            )));
        }

        let results: Vec<BatchItemResult> = stream::iter(requests.into_iter().enumerate())
            .map(|(index, request)| async move {
                let subject_id = request.subject_id.clone();
                let amount = request.amount;
                match self.score(request).await {
                    Ok(prediction) => BatchItemResult {
                        index,
                        subject_id,
                        amount,
                        success: true,
                        prediction: Some(prediction),
                        error: None,
                    },
                    Err(e) => {
                        debug!(index, error = %e, "batch item failed");
                        BatchItemResult {
                            index,
                            subject_id,
                            amount,
                            success: false,
                            prediction: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffered(self.config.parallelism())
            .collect()
            .await;

        let response = BatchScoreResponse::from_results(results);
        info!(
            total = response.total,
            successful = response.successful,
            failed = response.failed,
            "batch scored"
        );
        Ok(response)
    }

    /// Persist, score, evaluate rules and escalate one transaction.
    ///
    /// If any step after the insert fails, the unfinished record is dropped
    /// so that resubmitting the same reference completes it.
    pub async fn process_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<ProcessedTransaction> {
        let started = Instant::now();
        let request_id = Self::generate_request_id();
        let event = request.into_event(Utc::now())?;

        self.store
            .insert_transaction(TransactionRecord::pending(event.clone()))
            .await?;

        match self.complete_transaction(request_id, &event, started).await {
            Ok(processed) => Ok(processed),
            Err(e) => {
                self.release_unfinished(&event.reference, &e).await;
                Err(e)
            }
        }
    }

    /// Score, evaluate and escalate a stored pending transaction. The outcome
    /// is written last, once escalation has succeeded.
    async fn complete_transaction(
        &self,
        request_id: String,
        event: &TransactionEvent,
        started: Instant,
    ) -> Result<ProcessedTransaction> {
        let features = self.extractor.record_and_extract(event).await;
        let (result, triggered_rules) = tokio::join!(
            self.score_features(&features, started),
            self.rules.evaluate(event, &features)
        );
        let triggered_rules = triggered_rules?;

        let policy = self.escalator.policy();
        let status = TransactionStatus::from_score(
            result.fraud_score,
            policy.reject_threshold,
            policy.alert_threshold,
        );

        let outcome = self
            .escalator
            .escalate(event, &result, &triggered_rules, Utc::now())
            .await?;

        self.store
            .update_transaction_outcome(
                &event.reference,
                status,
                result.fraud_score,
                triggered_rules.clone(),
            )
            .await?;

        if let Some(metrics) = &self.metrics {
            metrics.counter(TRANSACTIONS_PROCESSED).inc();
        }
        self.record_latency(started);

        let risk_level = RiskLevel::from_score(result.fraud_score, &self.config.thresholds);
        let processed = ProcessedTransaction {
            request_id,
            reference: event.reference.clone(),
            status,
            fraud_score: result.fraud_score,
            confidence: result.confidence,
            risk_level,
            recommendation: risk_level.recommendation(),
            source: result.source,
            triggered_rules,
            alert_id: outcome.alert.map(|a| a.id),
            case_number: outcome.case.map(|c| c.case_number),
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        };

        info!(
            request_id = %processed.request_id,
            reference = %processed.reference,
            status = status.as_str(),
            fraud_score = processed.fraud_score,
            triggered = processed.triggered_rules.len(),
            alert_id = processed.alert_id.as_deref().unwrap_or("-"),
            case_number = processed.case_number.as_deref().unwrap_or("-"),
            "transaction processed"
        );
        Ok(processed)
    }

    async fn release_unfinished(&self, reference: &str, cause: &SdkError) {
        match self.store.remove_pending_transaction(reference).await {
            Ok(removed) => warn!(
                reference = %reference,
                removed,
                error = %cause,
                "transaction processing failed"
            ),
            Err(e) => error!(
                reference = %reference,
                error = %e,
                cause = %cause,
                "failed to release unfinished transaction"
            ),
        }
    }

    /// Open cases for overdue HIGH/CRITICAL alerts
    pub async fn escalate_pending(&self) -> Result<Vec<FraudCase>> {
        Ok(self.escalator.rescan(Utc::now()).await?)
    }

    pub async fn get_alert(&self, alert_id: &str) -> Result<Option<Alert>> {
        Ok(self.store.get_alert(alert_id).await?)
    }

    pub async fn get_transaction(&self, reference: &str) -> Result<Option<TransactionRecord>> {
        Ok(self.store.get_transaction(reference).await?)
    }

    pub async fn acknowledge_alert(&self, alert_id: &str, acknowledged_by: &str) -> Result<Alert> {
        Ok(self
            .cases
            .acknowledge_alert(alert_id, acknowledged_by, Utc::now())
            .await?)
    }

    pub async fn get_case(&self, case_number: &str) -> Result<CaseView> {
        let case = self.cases.get_case(case_number).await?;
        let notes = self.cases.list_notes(case_number).await?;
        Ok(CaseView { case, notes })
    }

    pub async fn assign_case(&self, case_number: &str, assignee: &str) -> Result<FraudCase> {
        Ok(self.cases.assign(case_number, assignee, Utc::now()).await?)
    }

    pub async fn update_case_status(
        &self,
        case_number: &str,
        status: CaseStatus,
        resolution_notes: Option<String>,
        actual_loss: Option<Decimal>,
    ) -> Result<FraudCase> {
        Ok(self
            .cases
            .update_status(case_number, status, resolution_notes, actual_loss, Utc::now())
            .await?)
    }

    pub async fn add_case_note(
        &self,
        case_number: &str,
        author: &str,
        content: &str,
        is_internal: bool,
    ) -> Result<CaseNote> {
        Ok(self
            .cases
            .add_note(case_number, author, content, is_internal, Utc::now())
            .await?)
    }

    /// Add or replace a fraud pattern
    pub async fn register_pattern(&self, pattern: FraudPattern) -> Result<()> {
        info!(pattern_id = %pattern.id, "registering fraud pattern");
        Ok(self.store.upsert_pattern(pattern).await?)
    }

    pub async fn pattern_feedback(&self, pattern_id: &str, confirmed_fraud: bool) -> Result<FraudPattern> {
        Ok(self.cases.pattern_feedback(pattern_id, confirmed_fraud).await?)
    }
}
