//! Observability module
//!
//! In-process metrics for the scoring pipeline. Structured logs go through
//! `tracing` at each call site.

pub mod metrics;

pub use metrics::{Counter, Histogram, Metrics, MetricsCollector, MetricsSnapshot};

/// Transactions fully processed
pub const TRANSACTIONS_PROCESSED: &str = "transactions_processed";
/// Scores produced by the deterministic heuristic
pub const SCORER_FALLBACKS: &str = "scorer_fallbacks";
/// Velocity reads that degraded to zero
pub const VELOCITY_DEGRADED: &str = "velocity_degraded_reads";
/// Pattern matches counted by the rule engine
pub const PATTERN_DETECTIONS: &str = "pattern_detections";
/// Alerts created
pub const ALERTS_CREATED: &str = "alerts_created";
/// Cases opened during scoring
pub const CASES_OPENED: &str = "cases_opened";
/// Cases opened by the escalation rescan
pub const RESCAN_ESCALATIONS: &str = "rescan_escalations";
/// End-to-end scoring latency
pub const SCORING: &str = "scoring";
