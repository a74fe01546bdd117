use async_trait::async_trait;

use super::settings_model::{QuoteSettings, QuoteSettingsUpdate};
use crate::Result;

/// Trait defining the contract for settings repository operations.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Loads the persisted settings, falling back to defaults for missing
    /// keys and ignoring unknown ones.
    fn get_settings(&self) -> Result<QuoteSettings>;
    async fn update_settings(&self, update: &QuoteSettingsUpdate) -> Result<()>;
}

/// Trait defining the contract for settings service operations.
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<QuoteSettings>;
    async fn update_settings(&self, update: QuoteSettingsUpdate) -> Result<QuoteSettings>;
}
