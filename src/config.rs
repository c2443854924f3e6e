//! Environment configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::pricing::PricingRules;
use crate::domain::value_objects::Money;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub nats_url: Option<String>,
    pub port: u16,
    pub catalog_path: Option<PathBuf>,
    pub pricing: PricingRules,
    pub hydration_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = PricingRules::default();
        Ok(Self {
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            nats_url: get("NATS_URL"),
            port: parse(&get, "PORT")?.unwrap_or(8083),
            catalog_path: get("CATALOG_PATH").map(PathBuf::from),
            pricing: PricingRules {
                free_shipping_threshold: money(&get, "FREE_SHIPPING_THRESHOLD")?.unwrap_or(defaults.free_shipping_threshold),
                flat_shipping_fee: money(&get, "FLAT_SHIPPING_FEE")?.unwrap_or(defaults.flat_shipping_fee),
                cod_surcharge: money(&get, "COD_SURCHARGE")?.unwrap_or(defaults.cod_surcharge),
            },
            hydration_timeout: parse::<u64>(&get, "PROFILE_HYDRATION_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(crate::checkout::DEFAULT_HYDRATION_TIMEOUT),
        })
    }
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    get(key)
        .map(|value| value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }))
        .transpose()
}

fn money(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<Money>, ConfigError> {
    match parse::<Decimal>(get, key)? {
        Some(amount) if amount.is_sign_negative() => Err(ConfigError::Invalid { key, value: amount.to_string() }),
        other => Ok(other.map(Money::new)),
    }
}
