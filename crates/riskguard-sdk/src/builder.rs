//! Builder pattern for FraudEngine

use crate::config::{EngineConfig, ScorerConfig};
use crate::error::{Result, SdkError};
use crate::fraud_engine::FraudEngine;
use riskguard_core::{FraudPattern, RiskThresholds};
use riskguard_runtime::{
    EscalationPolicy, Escalator, FeatureExtractor, FraudStore, HttpModelClient,
    InMemoryFraudStore, MemoryVelocityStore, MetricsCollector, ModelClient, ReputationTable,
    RiskScorer, RuleEngine, RuleSettings, VelocityStore,
};
use std::sync::Arc;

/// Builder for FraudEngine
///
/// # Example
///
/// ```rust,ignore
/// use riskguard_sdk::{FraudEngineBuilder, ScorerConfig};
///
/// // Model-backed scoring
/// let engine = FraudEngineBuilder::new()
///     .with_scorer(ScorerConfig::default().with_base_url("http://model:8000"))
///     .build()
///     .await?;
///
/// // Heuristic only, custom storage
/// let engine = FraudEngineBuilder::new()
///     .with_store(store)
///     .add_pattern(pattern)
///     .build()
///     .await?;
/// ```
pub struct FraudEngineBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn FraudStore>>,
    velocity: Option<Arc<dyn VelocityStore>>,
    model_client: Option<Arc<dyn ModelClient>>,
    reputation: Option<Arc<ReputationTable>>,
    metrics: Option<Arc<MetricsCollector>>,
    patterns: Vec<FraudPattern>,
}

impl FraudEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            store: None,
            velocity: None,
            model_client: None,
            reputation: None,
            metrics: None,
            patterns: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    pub fn with_escalation(mut self, policy: EscalationPolicy) -> Self {
        self.config.escalation = policy;
        self
    }

    pub fn with_rules(mut self, rules: RuleSettings) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn with_scorer(mut self, scorer: ScorerConfig) -> Self {
        self.config.scorer = scorer;
        self
    }

    pub fn with_high_risk_countries(mut self, countries: Vec<String>) -> Self {
        self.config.features.high_risk_countries = countries;
        self
    }

    pub fn with_processing_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.config.processing_deadline_ms = deadline_ms;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Storage backend; in-memory when unset
    pub fn with_store(mut self, store: Arc<dyn FraudStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Velocity counter backend; in-memory when unset
    pub fn with_velocity_store(mut self, velocity: Arc<dyn VelocityStore>) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Model client; takes precedence over `scorer.base_url`
    pub fn with_model_client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.model_client = Some(client);
        self
    }

    pub fn with_reputation(mut self, reputation: Arc<ReputationTable>) -> Self {
        self.reputation = Some(reputation);
        self
    }

    /// Share a metrics collector with the caller
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Add a fraud pattern, registered in storage on build
    pub fn add_pattern(mut self, pattern: FraudPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn add_patterns(mut self, patterns: Vec<FraudPattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    fn model_client(&self) -> Result<Option<Arc<dyn ModelClient>>> {
        if let Some(client) = &self.model_client {
            return Ok(Some(client.clone()));
        }
        match &self.config.scorer.base_url {
            Some(base_url) => {
                let client = HttpModelClient::new(base_url, self.config.scorer.timeout())
                    .map_err(|e| SdkError::ConfigError(format!("model client: {}", e)))?;
                Ok(Some(Arc::new(client)))
            }
            None => Ok(None),
        }
    }

    /// Build the fraud engine
    pub async fn build(self) -> Result<FraudEngine> {
        let metrics = if self.config.enable_metrics {
            Some(
                self.metrics
                    .clone()
                    .unwrap_or_else(|| Arc::new(MetricsCollector::new())),
            )
        } else {
            None
        };

        let store: Arc<dyn FraudStore> = self
            .store
            .clone()
            .unwrap_or_else(|| Arc::new(InMemoryFraudStore::new()));
        for pattern in &self.patterns {
            store.upsert_pattern(pattern.clone()).await?;
        }

        let velocity: Arc<dyn VelocityStore> = self
            .velocity
            .clone()
            .unwrap_or_else(|| Arc::new(MemoryVelocityStore::new()));

        let mut extractor = FeatureExtractor::new(velocity)
            .with_high_risk_countries(self.config.features.high_risk_countries.iter().cloned());
        if let Some(reputation) = &self.reputation {
            extractor = extractor.with_reputation(reputation.clone());
        }

        let mut scorer = match self.model_client()? {
            Some(client) => RiskScorer::new(client, self.config.scorer.timeout()),
            None => RiskScorer::heuristic_only(),
        }
        .with_model_version(self.config.scorer.model_version.clone());

        let mut rules = RuleEngine::new(self.config.rules.clone(), store.clone());
        let mut escalator = Escalator::new(self.config.escalation.clone(), store.clone());

        if let Some(metrics) = &metrics {
            extractor = extractor.with_metrics(metrics.clone());
            scorer = scorer.with_metrics(metrics.clone());
            rules = rules.with_metrics(metrics.clone());
            escalator = escalator.with_metrics(metrics.clone());
        }

        tracing::info!(
            model_configured = scorer.has_model(),
            patterns = self.patterns.len(),
            "fraud engine built"
        );

        Ok(FraudEngine::from_parts(
            self.config,
            store,
            extractor,
            scorer,
            rules,
            escalator,
            metrics,
        ))
    }
}

impl Default for FraudEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
