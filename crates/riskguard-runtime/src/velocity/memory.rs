//! In-memory velocity store
//!
//! Backed by sharded concurrent maps; the entry lock of a key serialises
//! read-modify-write on that key while other subjects proceed in parallel.

use super::{
    home_country_key, velocity_key, VelocitySnapshot, VelocityStore, VelocityWindow,
    HOME_COUNTRY_TTL_DAYS,
};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
struct WindowCounter {
    count: u64,
    amount: Decimal,
    expires_at: DateTime<Utc>,
}

impl WindowCounter {
    fn start(now: DateTime<Utc>, window: VelocityWindow) -> Self {
        Self {
            count: 0,
            amount: Decimal::ZERO,
            expires_at: now + window.duration(),
        }
    }
}

#[derive(Debug, Clone)]
struct HomeCountry {
    country: String,
    expires_at: DateTime<Utc>,
}

/// In-memory velocity store
///
/// Suitable for a single process; counters are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryVelocityStore {
    counters: DashMap<String, WindowCounter>,
    home_countries: DashMap<String, HomeCountry>,
}

impl MemoryVelocityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired counters and home-country entries
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.counters.len() + self.home_countries.len();
        self.counters.retain(|_, c| c.expires_at > now);
        self.home_countries.retain(|_, h| h.expires_at > now);
        before - (self.counters.len() + self.home_countries.len())
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[async_trait::async_trait]
impl VelocityStore for MemoryVelocityStore {
    async fn increment_and_read(
        &self,
        subject: &str,
        window: VelocityWindow,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<VelocitySnapshot> {
        let mut counter = self
            .counters
            .entry(velocity_key(subject, window))
            .or_insert_with(|| WindowCounter::start(now, window));

        if counter.expires_at <= now {
            *counter = WindowCounter::start(now, window);
        }

        let snapshot = VelocitySnapshot {
            count: counter.count,
            amount: counter.amount,
        };
        // saturate rather than overflow; count and amount move together
        let count = counter.count.saturating_add(1);
        let total = counter.amount.saturating_add(amount);
        counter.count = count;
        counter.amount = total;

        Ok(snapshot)
    }

    async fn seed_home_country(
        &self,
        subject: &str,
        country: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let mut home = self
            .home_countries
            .entry(home_country_key(subject))
            .or_insert_with(|| HomeCountry {
                country: country.to_string(),
                expires_at: now + Duration::days(HOME_COUNTRY_TTL_DAYS),
            });

        if home.expires_at <= now {
            *home = HomeCountry {
                country: country.to_string(),
                expires_at: now + Duration::days(HOME_COUNTRY_TTL_DAYS),
            };
        }

        Ok(home.country.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_n_increments_read_back_n() {
        let store = MemoryVelocityStore::new();
        let now = t0();

        for i in 0..5u64 {
            let snapshot = store
                .increment_and_read("u1", VelocityWindow::OneHour, Decimal::from(10), now)
                .await
                .unwrap();
            assert_eq!(snapshot.count, i);
            assert_eq!(snapshot.amount, Decimal::from(10 * i as i64));
        }

        let sixth = store
            .increment_and_read("u1", VelocityWindow::OneHour, Decimal::from(10), now)
            .await
            .unwrap();
        assert_eq!(sixth.count, 5);
        assert_eq!(sixth.amount, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let store = MemoryVelocityStore::new();
        let now = t0();

        for _ in 0..3 {
            store
                .increment_and_read("u1", VelocityWindow::OneHour, Decimal::ONE, now)
                .await
                .unwrap();
        }

        let within = store
            .increment_and_read(
                "u1",
                VelocityWindow::OneHour,
                Decimal::ONE,
                now + Duration::minutes(59),
            )
            .await
            .unwrap();
        assert_eq!(within.count, 3);

        let after = store
            .increment_and_read(
                "u1",
                VelocityWindow::OneHour,
                Decimal::ONE,
                now + Duration::minutes(61),
            )
            .await
            .unwrap();
        assert_eq!(after.count, 0);
        assert_eq!(after.amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_windows_and_subjects_are_independent() {
        let store = MemoryVelocityStore::new();
        let now = t0();

        store
            .increment_and_read("u1", VelocityWindow::OneHour, Decimal::ONE, now)
            .await
            .unwrap();

        let other_window = store
            .increment_and_read("u1", VelocityWindow::TwentyFourHours, Decimal::ONE, now)
            .await
            .unwrap();
        assert_eq!(other_window.count, 0);

        let other_subject = store
            .increment_and_read("u2", VelocityWindow::OneHour, Decimal::ONE, now)
            .await
            .unwrap();
        assert_eq!(other_subject.count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryVelocityStore::new());
        let now = t0();

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .increment_and_read("hot", VelocityWindow::OneHour, Decimal::ONE, now)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut seen: Vec<u64> = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap().count);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..200).collect::<Vec<u64>>());

        let last = store
            .increment_and_read("hot", VelocityWindow::OneHour, Decimal::ONE, now)
            .await
            .unwrap();
        assert_eq!(last.count, 200);
        assert_eq!(last.amount, Decimal::from(200));
    }

    #[tokio::test]
    async fn test_home_country_seeded_once() {
        let store = MemoryVelocityStore::new();
        let now = t0();

        assert_eq!(store.seed_home_country("u1", "US", now).await.unwrap(), "US");
        assert_eq!(
            store
                .seed_home_country("u1", "FR", now + Duration::days(1))
                .await
                .unwrap(),
            "US"
        );
        assert_eq!(
            store
                .seed_home_country("u1", "FR", now + Duration::days(31))
                .await
                .unwrap(),
            "FR"
        );
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryVelocityStore::new();
        let now = t0();
        store
            .increment_and_read("u1", VelocityWindow::OneHour, Decimal::ONE, now)
            .await
            .unwrap();
        store
            .increment_and_read("u1", VelocityWindow::TwentyFourHours, Decimal::ONE, now)
            .await
            .unwrap();

        assert_eq!(store.purge_expired(now + Duration::hours(2)), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_amount_saturates_instead_of_overflowing() {
        let store = MemoryVelocityStore::new();
        store
            .increment_and_read("user-1", VelocityWindow::OneHour, Decimal::MAX, t0())
            .await
            .unwrap();
        let second = store
            .increment_and_read("user-1", VelocityWindow::OneHour, Decimal::ONE, t0())
            .await
            .unwrap();
        assert_eq!(second.count, 1);
        assert_eq!(second.amount, Decimal::MAX);

        let third = store
            .increment_and_read("user-1", VelocityWindow::OneHour, Decimal::ONE, t0())
            .await
            .unwrap();
        assert_eq!(third.count, 2);
        assert_eq!(third.amount, Decimal::MAX);
    }
}
