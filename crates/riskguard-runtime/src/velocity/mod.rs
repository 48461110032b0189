//! Velocity counters
//!
//! Per-subject fixed-window counters (transaction count and cumulative
//! amount). A window starts at its first increment and resets to zero once
//! it expires, which approximates a sliding window.
//!
//! The store also keeps each subject's first-seen ("home") country.

mod memory;

pub use memory::MemoryVelocityStore;

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

/// Home country entries live this long
pub const HOME_COUNTRY_TTL_DAYS: i64 = 30;

/// Counter window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VelocityWindow {
    OneHour,
    TwentyFourHours,
}

impl VelocityWindow {
    pub fn duration(&self) -> Duration {
        match self {
            VelocityWindow::OneHour => Duration::hours(1),
            VelocityWindow::TwentyFourHours => Duration::hours(24),
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            VelocityWindow::OneHour => "1h",
            VelocityWindow::TwentyFourHours => "24h",
        }
    }
}

/// Counter state observed before an increment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocitySnapshot {
    pub count: u64,
    pub amount: Decimal,
}

/// `velocity:{subject}:{window}`
pub fn velocity_key(subject: &str, window: VelocityWindow) -> String {
    format!("velocity:{}:{}", subject, window.suffix())
}

/// `home_country:{subject}`
pub fn home_country_key(subject: &str) -> String {
    format!("home_country:{}", subject)
}

/// Trait for velocity counter backends
///
/// Increments on the same subject-window key must be linearizable.
#[async_trait::async_trait]
pub trait VelocityStore: Send + Sync {
    /// Add one transaction of `amount` to the window and return the state
    /// from before the increment
    async fn increment_and_read(
        &self,
        subject: &str,
        window: VelocityWindow,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<VelocitySnapshot>;

    /// Return the subject's home country, seeding it with `country` when
    /// none is cached
    async fn seed_home_country(
        &self,
        subject: &str,
        country: &str,
        now: DateTime<Utc>,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(velocity_key("u1", VelocityWindow::OneHour), "velocity:u1:1h");
        assert_eq!(
            velocity_key("u1", VelocityWindow::TwentyFourHours),
            "velocity:u1:24h"
        );
        assert_eq!(home_country_key("u1"), "home_country:u1");
    }
}
