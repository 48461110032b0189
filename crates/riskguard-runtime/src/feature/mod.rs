//! Feature extraction module
//!
//! Turns a transaction plus its subject's velocity state into the
//! fixed-order [`riskguard_core::FeatureVector`].

pub mod encoding;
pub mod extractor;
pub mod reputation;

// Re-export for convenience
pub use extractor::FeatureExtractor;
pub use reputation::ReputationTable;
