//! Deterministic fallback score
//!
//! Used whenever the model cannot answer. Depends only on the feature
//! vector, so identical features always give the identical score.

use riskguard_core::{FeatureContribution, FeatureVector};

/// Amount above which the large-amount weight applies
pub const VERY_LARGE_AMOUNT: f64 = 50_000.0;
/// Amount above which the medium-amount weight applies
pub const LARGE_AMOUNT: f64 = 10_000.0;
/// Prior 1h transactions above which the velocity weight applies
pub const VELOCITY_LIMIT: f64 = 10.0;

pub fn heuristic_score(features: &FeatureVector) -> f64 {
    let score: f64 = heuristic_contributions(features)
        .iter()
        .map(|c| c.importance)
        .sum();
    f64::min(score, 1.0)
}

/// The weights that fired, largest first
pub fn heuristic_contributions(features: &FeatureVector) -> Vec<FeatureContribution> {
    let mut contributions = Vec::new();

    if features.amount > VERY_LARGE_AMOUNT {
        contributions.push(contribution("amount", 0.3));
    } else if features.amount > LARGE_AMOUNT {
        contributions.push(contribution("amount", 0.2));
    }

    if features.txn_count_1h > VELOCITY_LIMIT {
        contributions.push(contribution("txn_count_1h", 0.3));
    }

    let hour = features.hour;
    if hour < 6.0 || hour > 23.0 {
        contributions.push(contribution("hour", 0.2));
    }

    contributions.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    contributions
}

fn contribution(feature: &str, importance: f64) -> FeatureContribution {
    FeatureContribution {
        feature: feature.to_string(),
        importance,
    }
}
