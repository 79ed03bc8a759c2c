use anyhow::{Context, Result};
use dhlpaket_core::AccountSettings;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "dhlpaket";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stores: vec![StoreConfig {
                store_id: 0,
                account: AccountSettings::sandbox(),
                default_product: Some(default_product()),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub store_id: u32,
    #[serde(default)]
    pub default_product: Option<String>, // e.g. "V01PAK"
    pub account: AccountSettings,
}

fn default_product() -> String {
    "V01PAK".to_string()
}

impl AppConfig {
    pub fn store_config(&self, store_id: u32) -> Option<&StoreConfig> {
        self.stores.iter().find(|s| s.store_id == store_id)
    }

    pub fn account(&self, store_id: u32) -> Option<&AccountSettings> {
        self.store_config(store_id).map(|s| &s.account)
    }

    /// Insert or replace the settings of a store.
    pub fn upsert_store(&mut self, store: StoreConfig) {
        match self.stores.iter_mut().find(|s| s.store_id == store.store_id) {
            Some(existing) => *existing = store,
            None => self.stores.push(store),
        }
    }
}

pub fn load() -> Result<AppConfig> {
    let cfg: AppConfig = confy::load(APP_NAME, None).context("Failed to load app config")?;
    Ok(cfg)
}

pub fn store(cfg: &AppConfig) -> Result<()> {
    confy::store(APP_NAME, None, cfg).context("Failed to store app config")?;
    Ok(())
}

/// Load from an explicit file instead of the platform config directory.
pub fn load_path(path: &std::path::Path) -> Result<AppConfig> {
    let cfg: AppConfig = confy::load_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(cfg)
}

pub fn store_path(path: &std::path::Path, cfg: &AppConfig) -> Result<()> {
    confy::store_path(path, cfg)
        .with_context(|| format!("Failed to store config to {}", path.display()))?;
    Ok(())
}
