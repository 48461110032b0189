//! Domain types for RiskGuard
//!
//! This module contains the data model shared by the engine:
//! - Transaction events and transaction status
//! - Feature vectors
//! - Score results and risk bands
//! - Rules, fraud patterns, alerts and cases

pub mod alert;
pub mod case;
pub mod features;
pub mod pattern;
pub mod rule;
pub mod score;
pub mod transaction;

pub use alert::{Alert, Severity};
pub use case::{CaseNote, CaseStatus, FraudCase};
pub use features::{FeatureVector, FEATURE_NAMES};
pub use pattern::{FraudPattern, PatternCondition};
pub use rule::{RuleId, TriggeredRule};
pub use score::{
    FeatureContribution, Recommendation, RiskLevel, RiskThresholds, ScoreResult, ScoreSource,
};
pub use transaction::{TransactionEvent, TransactionStatus};
