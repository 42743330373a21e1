//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `TRIPSPLIT__*` environment variables,
//! e.g. `TRIPSPLIT__APP__LEVEL=debug` or `TRIPSPLIT__CURRENCY=EUR`.
use config::{Config, ConfigError, Environment, File};
use engine::Currency;
use serde::Deserialize;

use crate::output::OutputFormat;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level for the `tripsplit` and `engine` targets.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    /// Currency used when a trip file does not declare one.
    pub currency: Currency,
    pub output: OutputFormat,
}

impl Settings {
    /// Loads settings; an explicit `path` must exist, the default one may not.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(path.is_some()))
            .add_source(Environment::with_prefix("TRIPSPLIT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_sources() {
        let settings: Settings = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.currency, Currency::Usd);
        assert_eq!(settings.output, OutputFormat::Table);
    }

    #[test]
    fn reads_toml_values() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                "currency = \"EUR\"\noutput = \"json\"\n[app]\nlevel = \"debug\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.currency, Currency::Eur);
        assert_eq!(settings.output, OutputFormat::Json);
    }

    #[test]
    fn currency_code_is_case_insensitive() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str("currency = \"gbp\"\n", config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.currency, Currency::Gbp);
    }
}
