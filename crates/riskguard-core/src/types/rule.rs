//! Deterministic rule identifiers and results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in rule identifiers, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    HighAmount,
    HighVelocity,
    LocationChange,
    UnusualTime,
    PatternMatch,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::HighAmount => "high_amount",
            RuleId::HighVelocity => "high_velocity",
            RuleId::LocationChange => "location_change",
            RuleId::UnusualTime => "unusual_time",
            RuleId::PatternMatch => "pattern_match",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule that matched a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredRule {
    pub rule: RuleId,
    pub message: String,

    /// Set for `pattern_match` results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<String>,
}

impl TriggeredRule {
    pub fn new(rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            pattern_id: None,
        }
    }

    pub fn pattern(pattern_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: RuleId::PatternMatch,
            message: message.into(),
            pattern_id: Some(pattern_id.into()),
        }
    }
}
