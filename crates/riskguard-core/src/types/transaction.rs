//! Transaction events
//!
//! A `TransactionEvent` is the unit the engine scores. It is immutable once
//! scored; every derived value (features, score, rules) refers back to it by
//! its `reference`.

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest amount a single transaction may carry
pub const MAX_TRANSACTION_AMOUNT: i64 = 1_000_000_000_000;

fn default_currency() -> String {
    "USD".to_string()
}

fn default_transaction_type() -> String {
    "payment".to_string()
}

/// A financial transaction submitted for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// Unique transaction reference
    pub reference: String,

    /// Subject (user/account) the transaction belongs to
    pub subject_id: String,

    #[serde(default)]
    pub account_number: Option<String>,

    /// Transaction amount, always positive
    pub amount: Decimal,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Transaction type (payment, transfer, withdrawal, deposit, purchase)
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

    /// Country code where the transaction happened
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub device_id: Option<String>,

    /// Event time
    pub timestamp: DateTime<Utc>,
}

impl TransactionEvent {
    /// Create an event with a generated reference, stamped now
    pub fn new(subject_id: impl Into<String>, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            reference: Self::generate_reference(now),
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
            timestamp: now,
        }
    }

    /// Generate a transaction reference: `TXN{YYYYMMDDHHMMSS}{8 hex chars}`
    pub fn generate_reference(at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        format!("TXN{}{}", at.format("%Y%m%d%H%M%S"), suffix)
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
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

    /// Reject events that must never reach the engine
    pub fn validate(&self) -> Result<()> {
        if self.reference.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "transaction reference is required".to_string(),
            ));
        }
        if self.subject_id.trim().is_empty() {
            return Err(CoreError::InvalidInput("subject id is required".to_string()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.amount > Decimal::from(MAX_TRANSACTION_AMOUNT) {
            return Err(CoreError::InvalidInput(format!(
                "amount must not exceed {}, got {}",
                MAX_TRANSACTION_AMOUNT, self.amount
            )));
        }
        Ok(())
    }
}

/// Outcome recorded on a processed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Approved,
    Flagged,
    Rejected,
}

impl TransactionStatus {
    /// `>= reject_at` rejects, `>= flag_at` flags, anything else is approved
    pub fn from_score(score: f64, reject_at: f64, flag_at: f64) -> Self {
        if score >= reject_at {
            TransactionStatus::Rejected
        } else if score >= flag_at {
            TransactionStatus::Flagged
        } else {
            TransactionStatus::Approved
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Flagged => "FLAGGED",
            TransactionStatus::Rejected => "REJECTED",
        }
    }
}
