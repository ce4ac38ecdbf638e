//! Configuration module
//!
//! Reads the TOML configuration file (`~/.config/parking-lot/config.toml` by
//! default). Every section is optional; missing values fall back to the
//! stock lot: 50 motorcycle, 100 car and 20 bus spots, with the standard
//! Airport, Stadium and Mall fee tables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::application::services::DEFAULT_CURRENCY;
use crate::domain::{FeeTable, SpotCounts, VehicleType};
use crate::support::errors::ConfigError;

const APP_DIR: &str = "parking-lot";
const CONFIG_FILE: &str = "config.toml";

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub lot: LotConfig,
    /// Fee tiers by location, then vehicle type
    pub fees: FeeTable,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            lot: LotConfig::default(),
            fees: FeeTable::standard(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    /// ISO 4217 code printed next to fees
    pub currency: String,
    /// Spots per vehicle type; a type left out has none
    pub capacity: SpotCounts,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            capacity: SpotCounts::from([
                (VehicleType::Motorcycle, 50),
                (VehicleType::Car, 100),
                (VehicleType::Bus, 20),
            ]),
        }
    }
}
