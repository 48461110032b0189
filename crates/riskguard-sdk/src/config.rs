//! Configuration types for FraudEngine

use riskguard_core::RiskThresholds;
use riskguard_runtime::{EscalationPolicy, RuleSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on model attempts per transaction
pub const MAX_MODEL_ATTEMPTS: u32 = 3;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Risk band thresholds
    pub thresholds: RiskThresholds,

    /// Severity and case escalation policy
    pub escalation: EscalationPolicy,

    /// Built-in rule tunables
    pub rules: RuleSettings,

    /// External model settings
    pub scorer: ScorerConfig,

    /// Feature extraction settings
    pub features: FeatureConfig,

    /// Overall budget for one transaction, model retries included
    pub processing_deadline_ms: u64,

    /// Concurrent items in a batch
    pub batch_parallelism: usize,

    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            escalation: EscalationPolicy::default(),
            rules: RuleSettings::default(),
            scorer: ScorerConfig::default(),
            features: FeatureConfig::default(),
            processing_deadline_ms: 10_000,
            batch_parallelism: 8,
            enable_metrics: true,
        }
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn with_rules(mut self, rules: RuleSettings) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_scorer(mut self, scorer: ScorerConfig) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    pub fn with_processing_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.processing_deadline_ms = deadline_ms;
        self
    }

    pub fn with_batch_parallelism(mut self, parallelism: usize) -> Self {
        self.batch_parallelism = parallelism;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    pub fn processing_deadline(&self) -> Duration {
        Duration::from_millis(self.processing_deadline_ms)
    }

    /// Batch parallelism, never zero
    pub fn parallelism(&self) -> usize {
        self.batch_parallelism.max(1)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// External model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Model service base URL; heuristic-only scoring when unset
    pub base_url: Option<String>,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Version reported on every score
    pub model_version: String,

    /// Model attempts per transaction (1..=3)
    pub max_attempts: u32,

    /// Base backoff between attempts; attempt n waits n times this
    pub retry_backoff_ms: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 5_000,
            model_version: "1.0".to_string(),
            max_attempts: 1,
            retry_backoff_ms: 100,
        }
    }
}

impl ScorerConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Attempts clamped into 1..=3
    pub fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_MODEL_ATTEMPTS)
    }

    /// Wait before attempt `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Feature extraction configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Country codes encoded as high risk
    pub high_risk_countries: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::new()
            .with_scorer(ScorerConfig::default().with_base_url("http://model:8000"))
            .with_batch_parallelism(4)
            .enable_metrics(false);

        assert_eq!(config.scorer.base_url.as_deref(), Some("http://model:8000"));
        assert_eq!(config.batch_parallelism, 4);
        assert!(!config.enable_metrics);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.thresholds.critical, 0.8);
        assert_eq!(config.escalation.rescan_min_age_minutes, 30);
        assert_eq!(config.rules.max_amount, Decimal::from(50_000));
        assert_eq!(config.scorer.timeout(), Duration::from_secs(5));
        assert_eq!(config.scorer.attempts(), 1);
        assert!(config.features.high_risk_countries.is_empty());
    }

    #[test]
    fn test_attempts_are_clamped() {
        assert_eq!(ScorerConfig::default().with_max_attempts(0).attempts(), 1);
        assert_eq!(ScorerConfig::default().with_max_attempts(7).attempts(), 3);
    }

    #[test]
    fn test_linear_backoff() {
        let scorer = ScorerConfig::default().with_retry_backoff_ms(50);
        assert_eq!(scorer.backoff(1), Duration::from_millis(50));
        assert_eq!(scorer.backoff(2), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"scorer": {"base_url": "http://model", "max_attempts": 2}, "rules": {"velocity_limit": 5}}"#,
        )
        .unwrap();

        assert_eq!(config.scorer.attempts(), 2);
        assert_eq!(config.scorer.timeout_ms, 5_000);
        assert_eq!(config.rules.velocity_limit, 5);
        assert_eq!(config.rules.location_window_minutes, 120);
        assert_eq!(config.batch_parallelism, 8);
    }

    #[test]
    fn test_parallelism_never_zero() {
        assert_eq!(EngineConfig::new().with_batch_parallelism(0).parallelism(), 1);
    }
}
