//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `SMARTSPLIT_*` environment
//! variables (e.g. `SMARTSPLIT_LEDGER__BALANCE_THRESHOLD=0.25`).
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use ledger::{MoneyCents, Threshold};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    /// Decimal amount, e.g. `"0.5"`.
    pub balance_threshold: String,
    /// JSON snapshot with users, groups, expenses and settlements.
    pub snapshot: Option<String>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            balance_threshold: Threshold::DEFAULT.amount().to_string(),
            snapshot: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub ledger: Ledger,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_PATH)).required(false))
            .add_source(
                Environment::with_prefix("SMARTSPLIT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Configured significance threshold, the default one if the value is
    /// invalid.
    pub fn threshold(&self) -> Threshold {
        let raw = self.ledger.balance_threshold.as_str();
        match raw
            .parse::<MoneyCents>()
            .and_then(Threshold::try_from)
        {
            Ok(threshold) => threshold,
            Err(err) => {
                tracing::warn!(
                    "invalid ledger.balance_threshold {raw:?} ({err}), using {}",
                    Threshold::DEFAULT.amount()
                );
                Threshold::DEFAULT
            }
        }
    }
}
