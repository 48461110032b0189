//! Risk scorer
//!
//! Delegates to an external model under a hard timeout. Every model call
//! ends in a [`ModelOutcome`]; anything other than `Scored` takes the
//! deterministic heuristic branch, so scoring itself never fails.

pub mod heuristic;
pub mod http;

pub use heuristic::{heuristic_contributions, heuristic_score};
pub use http::HttpModelClient;

use crate::observability::{Metrics, MetricsCollector, SCORER_FALLBACKS};
use chrono::Utc;
use riskguard_core::{FeatureContribution, FeatureVector, ScoreResult};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a single model call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("model call timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model returned status {0}")]
    Status(u16),

    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

/// Raw model answer
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    pub fraud_score: f64,
    pub top_features: Vec<FeatureContribution>,
}

/// Scoring model collaborator
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn predict(&self, features: &FeatureVector) -> Result<ModelPrediction, ModelError>;
}

/// Result of one bounded model call
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Scored(ModelPrediction),
    TimedOut,
    Failed(ModelError),
}

/// Scores feature vectors with a model and a heuristic fallback
pub struct RiskScorer {
    client: Option<Arc<dyn ModelClient>>,
    timeout: Duration,
    model_version: String,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RiskScorer {
    /// Scorer backed by a model client
    pub fn new(client: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            timeout,
            model_version: "1.0".to_string(),
            metrics: None,
        }
    }

    /// Scorer that always uses the heuristic
    pub fn heuristic_only() -> Self {
        Self {
            client: None,
            timeout: Duration::from_secs(5),
            model_version: "1.0".to_string(),
            metrics: None,
        }
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn has_model(&self) -> bool {
        self.client.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// One model call, bounded by the scorer timeout and by `budget` if it
    /// is shorter
    pub async fn call_model(
        &self,
        features: &FeatureVector,
        budget: Option<Duration>,
    ) -> ModelOutcome {
        let Some(client) = &self.client else {
            return ModelOutcome::Failed(ModelError::Transport(
                "no model client configured".to_string(),
            ));
        };

        let limit = budget.map_or(self.timeout, |b| b.min(self.timeout));
        match tokio::time::timeout(limit, client.predict(features)).await {
            Ok(Ok(prediction)) if prediction.fraud_score.is_finite() => {
                ModelOutcome::Scored(prediction)
            }
            Ok(Ok(prediction)) => ModelOutcome::Failed(ModelError::InvalidResponse(format!(
                "non-finite fraud score: {}",
                prediction.fraud_score
            ))),
            Ok(Err(ModelError::Timeout)) | Err(_) => ModelOutcome::TimedOut,
            Ok(Err(e)) => ModelOutcome::Failed(e),
        }
    }

    /// Turn an outcome into a score, falling back when the model had no answer
    pub fn resolve(&self, outcome: ModelOutcome, features: &FeatureVector) -> ScoreResult {
        match outcome {
            ModelOutcome::Scored(prediction) => {
                debug!(fraud_score = prediction.fraud_score, "model score");
                ScoreResult::from_model(
                    prediction.fraud_score,
                    self.model_version.clone(),
                    prediction.top_features,
                    Utc::now(),
                )
            }
            ModelOutcome::TimedOut => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "scorer unavailable: timeout, using fallback");
                self.fallback(features)
            }
            ModelOutcome::Failed(e) => {
                if self.client.is_some() {
                    warn!(error = %e, "scorer unavailable, using fallback");
                }
                self.fallback(features)
            }
        }
    }

    /// Single model attempt with fallback
    pub async fn score(&self, features: &FeatureVector) -> ScoreResult {
        let outcome = self.call_model(features, None).await;
        self.resolve(outcome, features)
    }

    /// Deterministic heuristic score; the fired weights become the top features
    pub fn fallback(&self, features: &FeatureVector) -> ScoreResult {
        if let Some(metrics) = &self.metrics {
            metrics.counter(SCORER_FALLBACKS).inc();
        }
        let mut result = ScoreResult::fallback(
            heuristic_score(features),
            self.model_version.clone(),
            Utc::now(),
        );
        result.top_features = heuristic_contributions(features);
        result
    }
}
