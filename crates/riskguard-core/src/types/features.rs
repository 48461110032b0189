//! Fixed-schema feature vector
//!
//! The field order of [`FeatureVector`] is the model input order and must stay
//! in sync with [`FEATURE_NAMES`].

use serde::{Deserialize, Serialize};

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; 19] = [
    "amount",
    "log_amount",
    "amount_bin",
    "hour",
    "day_of_week",
    "is_weekend",
    "is_night",
    "day_of_month",
    "txn_count_1h",
    "txn_amount_1h",
    "txn_count_24h",
    "txn_amount_24h",
    "avg_txn_amount_24h",
    "merchant_category_encoded",
    "merchant_risk_score",
    "country_encoded",
    "is_foreign_transaction",
    "device_risk_score",
    "transaction_type_encoded",
];

/// Numeric features derived from one transaction and its subject's velocity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    pub log_amount: f64,
    pub amount_bin: f64,
    pub hour: f64,
    pub day_of_week: f64,
    pub is_weekend: f64,
    pub is_night: f64,
    pub day_of_month: f64,
    pub txn_count_1h: f64,
    pub txn_amount_1h: f64,
    pub txn_count_24h: f64,
    pub txn_amount_24h: f64,
    pub avg_txn_amount_24h: f64,
    pub merchant_category_encoded: f64,
    pub merchant_risk_score: f64,
    pub country_encoded: f64,
    pub is_foreign_transaction: f64,
    pub device_risk_score: f64,
    pub transaction_type_encoded: f64,
}

impl FeatureVector {
    /// Values in model input order
    pub fn values(&self) -> [f64; 19] {
        [
            self.amount,
            self.log_amount,
            self.amount_bin,
            self.hour,
            self.day_of_week,
            self.is_weekend,
            self.is_night,
            self.day_of_month,
            self.txn_count_1h,
            self.txn_amount_1h,
            self.txn_count_24h,
            self.txn_amount_24h,
            self.avg_txn_amount_24h,
            self.merchant_category_encoded,
            self.merchant_risk_score,
            self.country_encoded,
            self.is_foreign_transaction,
            self.device_risk_score,
            self.transaction_type_encoded,
        ]
    }

    /// `(name, value)` pairs in model input order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.values())
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}
