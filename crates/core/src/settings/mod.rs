//! Settings module - quoting configuration models, service, and traits.

mod settings_model;
mod settings_service;
mod settings_traits;

// Re-export the public interface
pub use settings_model::{
    QuoteSettings, QuoteSettingsUpdate, SETTING_HOURLY_RATE, SETTING_RENDER_TIMEOUT_SECS,
    SETTING_VALIDITY_DAYS, SETTING_VAT_RATE,
};
pub use settings_service::SettingsService;
pub use settings_traits::{SettingsRepositoryTrait, SettingsServiceTrait};
