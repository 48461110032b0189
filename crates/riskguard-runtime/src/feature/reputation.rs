//! Merchant and device risk proxies

use dashmap::DashMap;

/// Risk assumed for a merchant or device we know nothing about
pub const NEUTRAL_RISK: f64 = 0.5;

/// Risk scores in [0, 1] keyed by merchant id and device id
#[derive(Debug, Default)]
pub struct ReputationTable {
    merchants: DashMap<String, f64>,
    devices: DashMap<String, f64>,
}

impl ReputationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_merchant_risk(&self, merchant_id: impl Into<String>, risk: f64) {
        self.merchants.insert(merchant_id.into(), risk.clamp(0.0, 1.0));
    }

    pub fn set_device_risk(&self, device_id: impl Into<String>, risk: f64) {
        self.devices.insert(device_id.into(), risk.clamp(0.0, 1.0));
    }

    pub fn merchant_risk(&self, merchant_id: Option<&str>) -> f64 {
        merchant_id
            .and_then(|id| self.merchants.get(id).map(|r| *r))
            .unwrap_or(NEUTRAL_RISK)
    }

    pub fn device_risk(&self, device_id: Option<&str>) -> f64 {
        device_id
            .and_then(|id| self.devices.get(id).map(|r| *r))
            .unwrap_or(NEUTRAL_RISK)
    }
}
