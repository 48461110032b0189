//! RiskGuard Runtime - Scoring pipeline components
//!
//! This crate provides the moving parts the engine wires together:
//! velocity counters, feature extraction, model scoring with a deterministic
//! fallback, the rule engine, storage, and alert/case escalation.

pub mod cases;
pub mod error;
pub mod escalation;
pub mod feature;
pub mod observability;
pub mod rules;
pub mod scorer;
pub mod storage;
pub mod velocity;

// Re-export main types
pub use cases::CaseService;
pub use error::{Result, RuntimeError};
pub use escalation::{EscalationDecision, EscalationOutcome, EscalationPolicy, Escalator};
pub use feature::{FeatureExtractor, ReputationTable};
pub use observability::{Metrics, MetricsCollector};
pub use rules::{RuleEngine, RuleSettings};
pub use scorer::{HttpModelClient, ModelClient, ModelError, ModelOutcome, ModelPrediction, RiskScorer};
pub use storage::{
    AlertFilter, CaseOpen, CaseUpdate, FraudStore, InMemoryFraudStore, TransactionRecord,
};
pub use velocity::{MemoryVelocityStore, VelocitySnapshot, VelocityStore, VelocityWindow};
