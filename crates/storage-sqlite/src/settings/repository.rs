use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use rust_decimal::Decimal;

use meerwerk_core::settings::{
    QuoteSettings, QuoteSettingsUpdate, SettingsRepositoryTrait, SETTING_HOURLY_RATE,
    SETTING_RENDER_TIMEOUT_SECS, SETTING_VALIDITY_DAYS, SETTING_VAT_RATE,
};
use meerwerk_core::Result;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_settings::dsl::*;

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self) -> Result<QuoteSettings> {
        let mut conn = get_connection(&self.pool)?;
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(&mut conn)
            .map_err(StorageError::from)?;

        let mut settings = QuoteSettings::default();

        for (key, value) in all_settings {
            match key.as_str() {
                SETTING_VAT_RATE => {
                    settings.vat_rate = Decimal::from_str(&value).unwrap_or(settings.vat_rate);
                }
                SETTING_HOURLY_RATE => {
                    settings.hourly_rate =
                        Decimal::from_str(&value).unwrap_or(settings.hourly_rate);
                }
                SETTING_VALIDITY_DAYS => {
                    settings.validity_days = value.parse().unwrap_or(settings.validity_days);
                }
                SETTING_RENDER_TIMEOUT_SECS => {
                    settings.render_timeout_secs =
                        value.parse().unwrap_or(settings.render_timeout_secs);
                }
                _ => {} // Ignore unknown settings
            }
        }

        Ok(settings)
    }

    async fn update_settings(&self, update: &QuoteSettingsUpdate) -> Result<()> {
        let update = update.clone();
        self.writer
            .exec(move |conn| {
                let mut rows: Vec<AppSettingDB> = Vec::new();
                if let Some(vat_rate) = update.vat_rate {
                    rows.push(AppSettingDB {
                        setting_key: SETTING_VAT_RATE.to_string(),
                        setting_value: vat_rate.to_string(),
                    });
                }
                if let Some(hourly_rate) = update.hourly_rate {
                    rows.push(AppSettingDB {
                        setting_key: SETTING_HOURLY_RATE.to_string(),
                        setting_value: hourly_rate.to_string(),
                    });
                }
                if let Some(validity_days) = update.validity_days {
                    rows.push(AppSettingDB {
                        setting_key: SETTING_VALIDITY_DAYS.to_string(),
                        setting_value: validity_days.to_string(),
                    });
                }
                if let Some(render_timeout_secs) = update.render_timeout_secs {
                    rows.push(AppSettingDB {
                        setting_key: SETTING_RENDER_TIMEOUT_SECS.to_string(),
                        setting_value: render_timeout_secs.to_string(),
                    });
                }

                for row in rows {
                    diesel::replace_into(app_settings)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}
