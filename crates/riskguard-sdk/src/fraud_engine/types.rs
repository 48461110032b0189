//! Request/Response types for FraudEngine

use crate::error::{Result, SdkError};
use chrono::{DateTime, Duration, Utc};
use riskguard_core::{
    CaseNote, FeatureContribution, FraudCase, Recommendation, RiskLevel, ScoreSource,
    TransactionEvent, TransactionStatus, TriggeredRule,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest accepted batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Number of features reported in a detailed explanation
pub const TOP_FEATURES: usize = 5;

/// How far ahead of the server clock a client timestamp may be
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

fn default_currency() -> String {
    "USD".to_string()
}

fn default_transaction_type() -> String {
    "payment".to_string()
}

/// Transaction submitted for scoring or processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Generated when absent
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(alias = "user_id")]
    pub subject_id: String,

    #[serde(default)]
    pub account_number: Option<String>,

    pub amount: Decimal,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_transaction_type")]
    pub transaction_type: String,

    #[serde(default)]
    pub merchant_id: Option<String>,

    #[serde(default)]
    pub merchant_name: Option<String>,

    #[serde(default)]
    pub merchant_category: Option<String>,

    #[serde(default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub device_id: Option<String>,

    /// Defaults to the time the request is handled
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TransactionRequest {
    /// Create a new request
    pub fn new(subject_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            reference: None,
            subject_id: subject_id.into(),
            account_number: None,
            amount,
            currency: default_currency(),
            transaction_type: default_transaction_type(),
            merchant_id: None,
            merchant_name: None,
            merchant_category: None,
            ip_address: None,
            country: None,
            city: None,
            device_id: None,
            timestamp: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_merchant(
        mut self,
        merchant_id: impl Into<String>,
        merchant_category: impl Into<String>,
    ) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self.merchant_category = Some(merchant_category.into());
        self
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_transaction_type(mut self, transaction_type: impl Into<String>) -> Self {
        self.transaction_type = transaction_type.into();
        self
    }

    /// Build and validate the event this request describes
    pub fn into_event(self, now: DateTime<Utc>) -> Result<TransactionEvent> {
        let timestamp = self.timestamp.unwrap_or(now);
        if timestamp > now + Duration::seconds(MAX_CLOCK_SKEW_SECS) {
            return Err(SdkError::InvalidInput(format!(
                "timestamp {} is in the future",
                timestamp.to_rfc3339()
            )));
        }
        let event = TransactionEvent {
            reference: self
                .reference
                .unwrap_or_else(|| TransactionEvent::generate_reference(timestamp)),
            subject_id: self.subject_id,
            account_number: self.account_number,
            amount: self.amount,
            currency: self.currency,
            transaction_type: self.transaction_type,
            merchant_id: self.merchant_id,
            merchant_name: self.merchant_name,
            merchant_category: self.merchant_category,
            ip_address: self.ip_address,
            country: self.country,
            city: self.city,
            device_id: self.device_id,
            timestamp,
        };
        event.validate()?;
        Ok(event)
    }
}

/// Single score response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Request ID (for tracking and correlation)
    pub request_id: String,

    pub fraud_score: f64,

    pub risk_level: RiskLevel,

    pub confidence: f64,

    pub recommendation: Recommendation,

    pub model_version: String,

    /// Whether the model or the heuristic produced the score
    pub source: ScoreSource,

    /// Processing time in milliseconds
    pub processing_time_ms: f64,

    pub timestamp: DateTime<Utc>,
}

/// Feature importance behind a score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub top_features: Vec<FeatureContribution>,
}

/// Score response with explanation and triggered rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedScoreResponse {
    #[serde(flatten)]
    pub score: ScoreResponse,

    pub explanation: Explanation,

    pub triggered_rules: Vec<TriggeredRule>,
}

/// Outcome of one batch item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    /// Position in the submitted batch
    pub index: usize,

    pub subject_id: String,

    pub amount: Decimal,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<ScoreResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch score response; `results` follows the input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchScoreResponse {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchScoreResponse {
    pub fn from_results(results: Vec<BatchItemResult>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }
}

/// Result of full transaction processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTransaction {
    pub request_id: String,
    pub reference: String,
    pub status: TransactionStatus,
    pub fraud_score: f64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
    pub source: ScoreSource,
    pub triggered_rules: Vec<TriggeredRule>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,

    pub processing_time_ms: f64,
}

/// A case with its notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseView {
    #[serde(flatten)]
    pub case: FraudCase,

    pub notes: Vec<CaseNote>,
}

/// Feature schema description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInfo {
    /// Feature names in vector order
    pub features: Vec<String>,

    /// Feature names by group
    pub feature_groups: Vec<FeatureGroup>,

    pub total_features: usize,

    pub model_version: String,

    /// Whether an external model is configured
    pub model_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub name: String,
    pub features: Vec<String>,
}

const FEATURE_GROUPS: [(&str, &[&str]); 7] = [
    ("transaction_features", &["amount", "log_amount", "amount_bin"]),
    (
        "temporal_features",
        &["hour", "day_of_week", "is_weekend", "is_night", "day_of_month"],
    ),
    (
        "velocity_features",
        &[
            "txn_count_1h",
            "txn_amount_1h",
            "txn_count_24h",
            "txn_amount_24h",
            "avg_txn_amount_24h",
        ],
    ),
    (
        "merchant_features",
        &["merchant_category_encoded", "merchant_risk_score"],
    ),
    (
        "location_features",
        &["country_encoded", "is_foreign_transaction"],
    ),
    ("device_features", &["device_risk_score"]),
    ("type_features", &["transaction_type_encoded"]),
];

impl FeatureInfo {
    pub fn new(model_version: impl Into<String>, model_configured: bool) -> Self {
        let features: Vec<String> = riskguard_core::FEATURE_NAMES
            .iter()
            .map(|name| name.to_string())
            .collect();
        Self {
            total_features: features.len(),
            features,
            feature_groups: FEATURE_GROUPS
                .iter()
                .map(|(name, members)| FeatureGroup {
                    name: name.to_string(),
                    features: members.iter().map(|m| m.to_string()).collect(),
                })
                .collect(),
            model_version: model_version.into(),
            model_configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskguard_core::FEATURE_NAMES;

    #[test]
    fn test_request_defaults_from_json() {
        let request: TransactionRequest =
            serde_json::from_str(r#"{"user_id": "user-1", "amount": 25.5}"#).unwrap();

        assert_eq!(request.subject_id, "user-1");
        assert_eq!(request.amount, Decimal::new(255, 1));
        assert_eq!(request.currency, "USD");
        assert_eq!(request.transaction_type, "payment");
        assert!(request.timestamp.is_none());
    }

    #[test]
    fn test_into_event_generates_reference() {
        let now = Utc::now();
        let event = TransactionRequest::new("user-1", Decimal::from(10))
            .into_event(now)
            .unwrap();

        assert!(event.reference.starts_with("TXN"));
        assert_eq!(event.reference.len(), 3 + 14 + 8);
        assert_eq!(event.timestamp, now);
    }

    #[test]
    fn test_into_event_validates() {
        let zero = TransactionRequest::new("user-1", Decimal::ZERO).into_event(Utc::now());
        assert!(matches!(zero, Err(SdkError::Core(_))));

        let anonymous = TransactionRequest::new("  ", Decimal::ONE).into_event(Utc::now());
        assert!(anonymous.is_err());
    }

    #[test]
    fn test_into_event_rejects_future_timestamps() {
        let now = Utc::now();
        let skewed = TransactionRequest::new("user-1", Decimal::ONE)
            .with_timestamp(now + Duration::seconds(MAX_CLOCK_SKEW_SECS))
            .into_event(now);
        assert!(skewed.is_ok());

        let future = TransactionRequest::new("user-1", Decimal::ONE)
            .with_timestamp(now + Duration::days(2))
            .into_event(now);
        assert!(matches!(future, Err(SdkError::InvalidInput(_))));
    }

    #[test]
    fn test_batch_counts() {
        let item = |index, success| BatchItemResult {
            index,
            subject_id: "u".to_string(),
            amount: Decimal::ONE,
            success,
            prediction: None,
            error: None,
        };
        let response = BatchScoreResponse::from_results(vec![item(0, true), item(1, false), item(2, true)]);
        assert_eq!(response.total, 3);
        assert_eq!(response.successful, 2);
        assert_eq!(response.failed, 1);
    }

    #[test]
    fn test_feature_groups_cover_schema() {
        let info = FeatureInfo::new("1.0", false);
        assert_eq!(info.total_features, 19);

        let mut grouped: Vec<String> = info
            .feature_groups
            .iter()
            .flat_map(|g| g.features.clone())
            .collect();
        grouped.sort();
        let mut names: Vec<String> = FEATURE_NAMES.iter().map(|n| n.to_string()).collect();
        names.sort();
        assert_eq!(grouped, names);
    }
}
