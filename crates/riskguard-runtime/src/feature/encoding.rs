//! Derived-feature encodings

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::HashSet;

/// Amount bucket: <10, <100, <1000, <10000, else
pub fn amount_bin(amount: f64) -> u8 {
    if amount < 10.0 {
        0
    } else if amount < 100.0 {
        1
    } else if amount < 1_000.0 {
        2
    } else if amount < 10_000.0 {
        3
    } else {
        4
    }
}

/// `ln(1 + amount)`
pub fn log_amount(amount: f64) -> f64 {
    amount.ln_1p()
}

pub fn is_night(hour: u32) -> bool {
    hour < 6 || hour > 22
}

/// Saturday or Sunday
pub fn is_weekend(at: DateTime<Utc>) -> bool {
    at.weekday().num_days_from_monday() >= 5
}

/// Hour of day in UTC
pub fn hour_of(at: DateTime<Utc>) -> u32 {
    at.hour()
}

/// Closed merchant category vocabulary, unknown is 0
pub fn encode_merchant_category(category: Option<&str>) -> u8 {
    let Some(category) = category else {
        return 0;
    };
    match category.trim().to_ascii_lowercase().as_str() {
        "grocery" => 1,
        "retail" => 2,
        "restaurant" => 3,
        "gas" => 4,
        "online" => 5,
        "travel" => 6,
        "entertainment" => 7,
        "healthcare" => 8,
        "utilities" => 9,
        _ => 0,
    }
}

/// Closed transaction type vocabulary, unknown is 0
pub fn encode_transaction_type(transaction_type: &str) -> u8 {
    match transaction_type.trim().to_ascii_lowercase().as_str() {
        "payment" => 1,
        "transfer" => 2,
        "withdrawal" => 3,
        "deposit" => 4,
        "purchase" => 5,
        _ => 0,
    }
}

/// High-risk country 3, any other country 1, none 0.
/// `high_risk` holds upper-cased codes.
pub fn encode_country(country: Option<&str>, high_risk: &HashSet<String>) -> u8 {
    match country.map(str::trim) {
        None | Some("") => 0,
        Some(c) if high_risk.contains(&c.to_ascii_uppercase()) => 3,
        Some(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_bin_boundaries() {
        assert_eq!(amount_bin(0.5), 0);
        assert_eq!(amount_bin(9.99), 0);
        assert_eq!(amount_bin(10.0), 1);
        assert_eq!(amount_bin(99.99), 1);
        assert_eq!(amount_bin(100.0), 2);
        assert_eq!(amount_bin(999.0), 2);
        assert_eq!(amount_bin(1_000.0), 3);
        assert_eq!(amount_bin(9_999.99), 3);
        assert_eq!(amount_bin(10_000.0), 4);
        assert_eq!(amount_bin(60_000.0), 4);
    }

    #[test]
    fn test_log_amount() {
        assert_eq!(log_amount(0.0), 0.0);
        assert!((log_amount(std::f64::consts::E - 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_night_hours() {
        assert!(is_night(0));
        assert!(is_night(5));
        assert!(!is_night(6));
        assert!(!is_night(22));
        assert!(is_night(23));
    }

    #[test]
    fn test_weekend() {
        let saturday = DateTime::parse_from_rfc3339("2024-06-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let monday = DateTime::parse_from_rfc3339("2024-06-03T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(is_weekend(saturday));
        assert!(!is_weekend(monday));
    }

    #[test]
    fn test_merchant_category_codes() {
        assert_eq!(encode_merchant_category(Some("grocery")), 1);
        assert_eq!(encode_merchant_category(Some("Travel")), 6);
        assert_eq!(encode_merchant_category(Some("utilities")), 9);
        assert_eq!(encode_merchant_category(Some("casino")), 0);
        assert_eq!(encode_merchant_category(None), 0);
    }

    #[test]
    fn test_transaction_type_codes() {
        assert_eq!(encode_transaction_type("payment"), 1);
        assert_eq!(encode_transaction_type("TRANSFER"), 2);
        assert_eq!(encode_transaction_type("purchase"), 5);
        assert_eq!(encode_transaction_type("refund"), 0);
    }

    #[test]
    fn test_country_codes() {
        let high_risk: HashSet<String> = ["NG".to_string()].into_iter().collect();
        assert_eq!(encode_country(Some("ng"), &high_risk), 3);
        assert_eq!(encode_country(Some("US"), &high_risk), 1);
        assert_eq!(encode_country(Some(""), &high_risk), 0);
        assert_eq!(encode_country(None, &high_risk), 0);
    }
}
