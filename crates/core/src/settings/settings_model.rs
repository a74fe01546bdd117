//! Quoting settings models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Setting keys as persisted in the key-value settings store.
pub const SETTING_VAT_RATE: &str = "vat_rate";
pub const SETTING_HOURLY_RATE: &str = "hourly_rate";
pub const SETTING_VALIDITY_DAYS: &str = "validity_days";
pub const SETTING_RENDER_TIMEOUT_SECS: &str = "render_timeout_secs";

/// Configuration governing quote creation and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettings {
    /// VAT applied as a fixed fraction of the subtotal (0.21 = 21%).
    pub vat_rate: Decimal,
    /// Hourly rate used to price labor lines.
    pub hourly_rate: Decimal,
    /// Validity window applied at quote creation, in days.
    pub validity_days: i64,
    /// Upper bound on a single document rendering call.
    pub render_timeout_secs: u64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            vat_rate: Decimal::new(21, 2),
            hourly_rate: Decimal::from(85),
            validity_days: 30,
            render_timeout_secs: 30,
        }
    }
}

/// Partial update for quote settings; `None` leaves a value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettingsUpdate {
    pub vat_rate: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub validity_days: Option<i64>,
    pub render_timeout_secs: Option<u64>,
}
