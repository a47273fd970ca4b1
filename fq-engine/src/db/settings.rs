//! Settings persistence
//!
//! One JSON document under `app_settings_v3`, merged over defaults on load.

use crate::models::AppSettings;
use fq_common::db::{get_json, set_json};
use fq_common::Result;
use sqlx::SqlitePool;
use tracing::{error, warn};

pub const SETTINGS_KEY: &str = "app_settings_v3";

/// Settings store over the key/value table
#[derive(Clone)]
pub struct SettingsStore {
    db: SqlitePool,
}

impl SettingsStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Stored settings, or defaults when absent or unreadable
    pub async fn load(&self) -> AppSettings {
        match get_json::<AppSettings>(&self.db, SETTINGS_KEY).await {
            Ok(Some(settings)) => settings,
            Ok(None) => AppSettings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                AppSettings::default()
            }
        }
    }

    /// Persist a full settings document
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        set_json(&self.db, SETTINGS_KEY, settings).await
    }

    /// Apply a change and persist it
    ///
    /// The updated settings are returned even when saving failed, so the
    /// in-memory view follows the user's choice.
    pub async fn update<F>(&self, change: F) -> AppSettings
    where
        F: FnOnce(&mut AppSettings),
    {
        let mut settings = self.load().await;
        change(&mut settings);

        if let Err(e) = self.save(&settings).await {
            error!(error = %e, "Failed to save settings");
        }

        settings
    }
}
