//! RiskGuard Core - Core types and definitions for the RiskGuard risk engine
//!
//! This crate provides the fundamental types shared by every RiskGuard crate:
//! - Transaction events and the fixed-order feature vector
//! - Score results, risk levels and recommendations
//! - Triggered rules and fraud patterns
//! - Alerts, investigation cases and case notes
//! - Error types

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use types::{
    Alert, CaseNote, CaseStatus, FeatureContribution, FeatureVector, FraudCase, FraudPattern,
    PatternCondition, Recommendation, RiskLevel, RiskThresholds, RuleId, ScoreResult, ScoreSource,
    Severity, TransactionEvent, TransactionStatus, TriggeredRule, FEATURE_NAMES,
};
