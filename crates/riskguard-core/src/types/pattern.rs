//! Configurable fraud patterns
//!
//! A pattern is a set of conditions that must all hold for a transaction to
//! match. Each condition is a tagged variant so new predicate kinds do not
//! require ad hoc key lookups.

use super::transaction::TransactionEvent;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single pattern predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternCondition {
    /// Inclusive amount bounds; a missing bound is open
    AmountRange {
        #[serde(default)]
        min: Option<Decimal>,
        #[serde(default)]
        max: Option<Decimal>,
    },
    /// Merchant category allow-list
    MerchantCategories { categories: Vec<String> },
    /// Country allow-list
    Countries { countries: Vec<String> },
}

fn contains_ignore_case(list: &[String], value: Option<&str>) -> bool {
    match value {
        Some(v) => list.iter().any(|item| item.eq_ignore_ascii_case(v)),
        None => false,
    }
}

impl PatternCondition {
    /// A field the condition needs but the event lacks fails the condition
    pub fn matches(&self, event: &TransactionEvent) -> bool {
        match self {
            PatternCondition::AmountRange { min, max } => {
                min.map_or(true, |min| event.amount >= min)
                    && max.map_or(true, |max| event.amount <= max)
            }
            PatternCondition::MerchantCategories { categories } => {
                contains_ignore_case(categories, event.merchant_category.as_deref())
            }
            PatternCondition::Countries { countries } => {
                contains_ignore_case(countries, event.country.as_deref())
            }
        }
    }
}

fn default_active() -> bool {
    true
}

/// Named condition set with detection statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudPattern {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub pattern_type: String,

    #[serde(default)]
    pub description: Option<String>,

    pub conditions: Vec<PatternCondition>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub detection_count: u64,

    #[serde(default)]
    pub true_positive_count: u64,

    #[serde(default)]
    pub false_positive_count: u64,

    #[serde(default)]
    pub last_detected_at: Option<DateTime<Utc>>,
}

impl FraudPattern {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        conditions: Vec<PatternCondition>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pattern_type: String::new(),
            description: None,
            conditions,
            is_active: true,
            detection_count: 0,
            true_positive_count: 0,
            false_positive_count: 0,
            last_detected_at: None,
        }
    }

    /// A pattern without conditions would match every transaction
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::InvalidInput("pattern id is required".to_string()));
        }
        if self.conditions.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "pattern {} has no conditions",
                self.id
            )));
        }
        Ok(())
    }

    /// Active and every condition holds
    pub fn matches(&self, event: &TransactionEvent) -> bool {
        self.is_active
            && !self.conditions.is_empty()
            && self.conditions.iter().all(|c| c.matches(event))
    }

    pub fn record_detection(&mut self, at: DateTime<Utc>) {
        self.detection_count += 1;
        self.last_detected_at = Some(at);
    }

    /// Analyst verdict on a detection
    pub fn record_feedback(&mut self, confirmed_fraud: bool) {
        if confirmed_fraud {
            self.true_positive_count += 1;
        } else {
            self.false_positive_count += 1;
        }
    }

    /// `tp / (tp + fp)`, 0 without feedback
    pub fn accuracy(&self) -> f64 {
        let total = self.true_positive_count + self.false_positive_count;
        if total == 0 {
            0.0
        } else {
            self.true_positive_count as f64 / total as f64
        }
    }
}
