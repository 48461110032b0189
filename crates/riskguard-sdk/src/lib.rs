//! RiskGuard SDK
//!
//! High-level API for scoring transactions and driving the alert/case
//! lifecycle.

pub mod builder;
pub mod config;
pub mod error;
pub mod fraud_engine;

// Re-export main types
pub use builder::FraudEngineBuilder;
pub use config::{EngineConfig, FeatureConfig, ScorerConfig};
pub use error::{Result, SdkError};
pub use fraud_engine::{
    BatchItemResult, BatchScoreResponse, CaseView, DetailedScoreResponse, Explanation,
    FeatureInfo, FraudEngine, ProcessedTransaction, ScoreResponse, TransactionRequest,
    MAX_BATCH_SIZE,
};

// Re-export commonly used types from dependencies
pub use riskguard_core::{
    Alert, CaseNote, CaseStatus, FraudCase, FraudPattern, PatternCondition, Recommendation,
    RiskLevel, RiskThresholds, Severity, TransactionStatus, TriggeredRule,
};
pub use riskguard_runtime::{
    EscalationPolicy, FraudStore, InMemoryFraudStore, MetricsCollector, ModelClient,
    ReputationTable, RuleSettings, VelocityStore,
};
