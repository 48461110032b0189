//! Score results and the bands derived from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Model,
    Fallback,
}

/// One entry of a model explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub importance: f64,
}

/// Result of scoring one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Fraud probability in [0, 1]
    pub fraud_score: f64,

    /// Confidence in [0, 1]
    pub confidence: f64,

    pub model_version: String,

    pub computed_at: DateTime<Utc>,

    pub source: ScoreSource,

    /// Top contributing features, most important first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_features: Vec<FeatureContribution>,
}

impl ScoreResult {
    /// Build a result from a model score. The score is clamped into [0, 1].
    pub fn from_model(
        score: f64,
        model_version: impl Into<String>,
        top_features: Vec<FeatureContribution>,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let fraud_score = score.clamp(0.0, 1.0);
        Self {
            fraud_score,
            confidence: model_confidence(fraud_score),
            model_version: model_version.into(),
            computed_at,
            source: ScoreSource::Model,
            top_features,
        }
    }

    /// Build a heuristic result. Fallback scores carry no confidence.
    pub fn fallback(
        score: f64,
        model_version: impl Into<String>,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            fraud_score: score.clamp(0.0, 1.0),
            confidence: 0.0,
            model_version: model_version.into(),
            computed_at,
            source: ScoreSource::Fallback,
            top_features: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ScoreSource::Fallback
    }
}

/// Distance from the decision boundary, scaled to [0, 1]
pub fn model_confidence(score: f64) -> f64 {
    ((score - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}

/// Score thresholds for the risk bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 0.8,
            high: 0.5,
            medium: 0.3,
        }
    }
}

/// Discretised risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Step function of the score
    pub fn from_score(score: f64, thresholds: &RiskThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        match self {
            RiskLevel::Critical => Recommendation::Reject,
            RiskLevel::High => Recommendation::ReviewRequired,
            RiskLevel::Medium => Recommendation::FlagForMonitoring,
            RiskLevel::Low => Recommendation::Approve,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Action suggested to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Reject,
    ReviewRequired,
    FlagForMonitoring,
    Approve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(RiskLevel::from_score(0.0, &t), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.29, &t), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.3, &t), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.5, &t), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.79, &t), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8, &t), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0, &t), RiskLevel::Critical);
    }

    #[test]
    fn test_risk_level_is_monotonic() {
        let t = RiskThresholds::default();
        let mut previous = RiskLevel::Low;
        for i in 0..=100 {
            let level = RiskLevel::from_score(i as f64 / 100.0, &t);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let t = RiskThresholds {
            critical: 0.9,
            high: 0.6,
            medium: 0.2,
        };
        assert_eq!(RiskLevel::from_score(0.85, &t), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.25, &t), RiskLevel::Medium);
    }

    #[test]
    fn test_recommendation_mapping() {
        assert_eq!(RiskLevel::Critical.recommendation(), Recommendation::Reject);
        assert_eq!(RiskLevel::High.recommendation(), Recommendation::ReviewRequired);
        assert_eq!(
            RiskLevel::Medium.recommendation(),
            Recommendation::FlagForMonitoring
        );
        assert_eq!(RiskLevel::Low.recommendation(), Recommendation::Approve);
    }

    #[test]
    fn test_recommendation_serialization() {
        let json = serde_json::to_string(&Recommendation::FlagForMonitoring).unwrap();
        assert_eq!(json, "\"FLAG_FOR_MONITORING\"");
    }

    #[test]
    fn test_model_confidence() {
        assert_eq!(model_confidence(0.5), 0.0);
        assert_eq!(model_confidence(1.0), 1.0);
        assert_eq!(model_confidence(0.0), 1.0);
        assert!((model_confidence(0.75) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_model_score_is_clamped() {
        let now = Utc::now();
        let high = ScoreResult::from_model(1.7, "1.0", vec![], now);
        assert_eq!(high.fraud_score, 1.0);
        assert_eq!(high.confidence, 1.0);

        let low = ScoreResult::from_model(-0.2, "1.0", vec![], now);
        assert_eq!(low.fraud_score, 0.0);
    }

    #[test]
    fn test_fallback_has_zero_confidence() {
        let result = ScoreResult::fallback(0.5, "1.0", Utc::now());
        assert!(result.is_fallback());
        assert_eq!(result.confidence, 0.0);
    }
}
