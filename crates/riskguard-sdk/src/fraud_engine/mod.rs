//! FraudEngine - Main API for scoring and escalation
//!
//! # Architecture
//!
//! The module is organized into:
//! - `types`: Request/Response types (TransactionRequest, ScoreResponse, ...)
//! - `engine`: Core FraudEngine implementation
//! - `tests`: Unit tests (test-only)

mod engine;
mod types;

// Re-export public types
pub use engine::FraudEngine;
pub use types::{
    BatchItemResult, BatchScoreResponse, CaseView, DetailedScoreResponse, Explanation,
    FeatureGroup, FeatureInfo, ProcessedTransaction, ScoreResponse, TransactionRequest,
    MAX_BATCH_SIZE, TOP_FEATURES,
};

// Tests module (only compiled in test mode)
#[cfg(test)]
mod tests;
