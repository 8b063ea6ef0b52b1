//! Store settings, loaded from TOML.
//!
//! ```toml
//! stock_cap = 10
//! opening_balance = 100.0
//! discount_percent = 10
//! discount_validity_days = 30
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::Amount;
use crate::account::DiscountPolicy;
use crate::catalog::DEFAULT_STOCK_CAP;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Most units a single title may have in stock.
    pub stock_cap: u32,
    /// Balance every new account starts with.
    pub opening_balance: f64,
    /// Next-purchase discount earned by a trade-in.
    pub discount_percent: u32,
    pub discount_validity_days: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            stock_cap: DEFAULT_STOCK_CAP,
            opening_balance: 100.0,
            discount_percent: DiscountPolicy::DEFAULT.percent,
            discount_validity_days: DiscountPolicy::DEFAULT.validity_days,
        }
    }
}

impl StoreConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stock_cap == 0 {
            return Err(ConfigError::Invalid("stock_cap must be at least 1".into()));
        }
        if self.opening_balance < 0.0 || Amount::try_from_float(self.opening_balance).is_none() {
            return Err(ConfigError::Invalid(format!(
                "opening_balance must be a non-negative number, got {}",
                self.opening_balance
            )));
        }
        if self.discount_percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "discount_percent must be at most 100, got {}",
                self.discount_percent
            )));
        }
        Ok(())
    }

    /// Opening balance in cents. Zero when the value has no cent representation,
    /// which [`validate`](Self::validate) rejects.
    pub fn opening_balance(&self) -> Amount {
        Amount::try_from_float(self.opening_balance).unwrap_or(Amount::ZERO)
    }

    pub fn discount_policy(&self) -> DiscountPolicy {
        DiscountPolicy {
            percent: self.discount_percent,
            validity_days: self.discount_validity_days,
        }
    }
}
