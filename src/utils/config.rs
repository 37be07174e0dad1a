use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::models::quantity::AmountSettings;

pub const DEFAULT_DELIVERY_FEE: f64 = 20.0;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Amount bounds are invalid: {message}")]
    InvalidAmountBounds { message: String },

    #[error("DELIVERY_FEE must be a non-negative number, got {0}")]
    InvalidDeliveryFee(f64),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub menu_data_path: Option<PathBuf>,
    pub delivery_fee: f64,
    pub amount: AmountSettings,
    pub log_level: String,
    pub environment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            menu_data_path: None,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            amount: AmountSettings::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let settings = Self::from_lookup(|key| env::var(key).ok())?;

        tracing::info!(
            "Config: successfully loaded for {} environment",
            settings.environment
        );
        Ok(settings)
    }

    /// Build settings from any key lookup; `from_env` plugs in the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let settings = Settings {
            menu_data_path: lookup("MENU_DATA_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            delivery_fee: parse_or(&lookup, "DELIVERY_FEE", defaults.delivery_fee)?,
            amount: AmountSettings {
                default: parse_or(&lookup, "AMOUNT_DEFAULT", defaults.amount.default)?,
                min: parse_or(&lookup, "AMOUNT_MIN", defaults.amount.min)?,
                max: parse_or(&lookup, "AMOUNT_MAX", defaults.amount.max)?,
            },
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment: lookup("APP_ENV").unwrap_or(defaults.environment),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delivery_fee.is_finite() || self.delivery_fee < 0.0 {
            return Err(ConfigError::InvalidDeliveryFee(self.delivery_fee));
        }

        let amount = &self.amount;
        if amount.min > amount.max {
            return Err(ConfigError::InvalidAmountBounds {
                message: format!("min {} is greater than max {}", amount.min, amount.max),
            });
        }
        if amount.default < amount.min || amount.default > amount.max {
            return Err(ConfigError::InvalidAmountBounds {
                message: format!(
                    "default {} is outside [{}, {}]",
                    amount.default, amount.min, amount.max
                ),
            });
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Filter directive for the log subscriber, chosen before settings load:
/// `--verbose`, then `RUST_LOG`, then `LOG_LEVEL`, then `info`.
pub fn log_directive<F>(verbose: bool, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if verbose {
        return "debug".to_string();
    }

    ["RUST_LOG", "LOG_LEVEL"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| Settings::default().log_level)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.delivery_fee, 20.0);
        assert_eq!(settings.amount, AmountSettings { default: 1, min: 1, max: 9 });
        assert!(settings.menu_data_path.is_none());
        assert!(!settings.is_production());
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DELIVERY_FEE", "12.5"),
            ("AMOUNT_MAX", "20"),
            ("MENU_DATA_PATH", "/tmp/menu.json"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(settings.delivery_fee, 12.5);
        assert_eq!(settings.amount.max, 20);
        assert_eq!(settings.menu_data_path, Some(PathBuf::from("/tmp/menu.json")));
        assert!(settings.is_production());
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = Settings::from_lookup(lookup_from(&[("AMOUNT_MIN", "one")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "AMOUNT_MIN".to_string(),
                value: "one".to_string()
            }
        );
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("AMOUNT_MIN", "5"), ("AMOUNT_MAX", "2")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAmountBounds { .. }));
    }

    #[test]
    fn test_default_outside_bounds_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("AMOUNT_DEFAULT", "10")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAmountBounds { .. }));
    }

    #[test]
    fn test_log_directive_precedence() {
        let both = lookup_from(&[("RUST_LOG", "warn"), ("LOG_LEVEL", "error")]);
        assert_eq!(log_directive(true, &both), "debug");
        assert_eq!(log_directive(false, &both), "warn");
        assert_eq!(log_directive(false, lookup_from(&[("LOG_LEVEL", "error")])), "error");
        assert_eq!(log_directive(false, lookup_from(&[("RUST_LOG", " ")])), "info");
    }

    #[test]
    fn test_large_amount_bounds_are_accepted() {
        let settings =
            Settings::from_lookup(lookup_from(&[("AMOUNT_MAX", "4294967295")])).unwrap();
        assert_eq!(settings.amount.max, u32::MAX);
    }

    #[test]
    fn test_negative_delivery_fee_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("DELIVERY_FEE", "-1")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidDeliveryFee(-1.0));
    }
}
