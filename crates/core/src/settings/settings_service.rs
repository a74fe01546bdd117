use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::settings_model::{QuoteSettings, QuoteSettingsUpdate};
use super::settings_traits::{SettingsRepositoryTrait, SettingsServiceTrait};
use crate::errors::ValidationError;
use crate::{Error, Result};

/// Service for reading and updating quoting configuration.
pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        Self {
            settings_repository,
        }
    }

    fn validate(update: &QuoteSettingsUpdate) -> Result<()> {
        if let Some(vat_rate) = update.vat_rate {
            if vat_rate < Decimal::ZERO || vat_rate >= Decimal::ONE {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "VAT rate must be a fraction in [0, 1)".to_string(),
                )));
            }
        }
        if let Some(hourly_rate) = update.hourly_rate {
            if hourly_rate < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Hourly rate cannot be negative".to_string(),
                )));
            }
        }
        if let Some(validity_days) = update.validity_days {
            if validity_days <= 0 {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Validity window must be at least one day".to_string(),
                )));
            }
        }
        if let Some(render_timeout_secs) = update.render_timeout_secs {
            if render_timeout_secs == 0 {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Render timeout must be at least one second".to_string(),
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<QuoteSettings> {
        self.settings_repository.get_settings()
    }

    async fn update_settings(&self, update: QuoteSettingsUpdate) -> Result<QuoteSettings> {
        Self::validate(&update)?;
        self.settings_repository.update_settings(&update).await?;
        self.settings_repository.get_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct InMemorySettingsRepository {
        settings: Mutex<QuoteSettings>,
    }

    impl InMemorySettingsRepository {
        fn new() -> Self {
            Self {
                settings: Mutex::new(QuoteSettings::default()),
            }
        }
    }

    #[async_trait]
    impl SettingsRepositoryTrait for InMemorySettingsRepository {
        fn get_settings(&self) -> Result<QuoteSettings> {
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn update_settings(&self, update: &QuoteSettingsUpdate) -> Result<()> {
            let mut settings = self.settings.lock().unwrap();
            if let Some(vat_rate) = update.vat_rate {
                settings.vat_rate = vat_rate;
            }
            if let Some(hourly_rate) = update.hourly_rate {
                settings.hourly_rate = hourly_rate;
            }
            if let Some(validity_days) = update.validity_days {
                settings.validity_days = validity_days;
            }
            if let Some(render_timeout_secs) = update.render_timeout_secs {
                settings.render_timeout_secs = render_timeout_secs;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn updates_only_provided_fields() {
        let service = SettingsService::new(Arc::new(InMemorySettingsRepository::new()));

        let updated = service
            .update_settings(QuoteSettingsUpdate {
                hourly_rate: Some(Decimal::from(95)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.hourly_rate, Decimal::from(95));
        assert_eq!(updated.vat_rate, QuoteSettings::default().vat_rate);
    }

    #[tokio::test]
    async fn rejects_out_of_range_vat_rate() {
        let service = SettingsService::new(Arc::new(InMemorySettingsRepository::new()));

        let err = service
            .update_settings(QuoteSettingsUpdate {
                vat_rate: Some(Decimal::from(2)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_zero_validity_window() {
        let service = SettingsService::new(Arc::new(InMemorySettingsRepository::new()));

        let err = service
            .update_settings(QuoteSettingsUpdate {
                validity_days: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
