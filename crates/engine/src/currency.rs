use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents};

/// ISO currency code used by a trip and its expenses.
///
/// A trip is mono-currency: every expense recorded in it shares the trip's
/// currency, so splitting never converts between currencies.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// [`MoneyCents`]). `minor_units()` returns how many decimal digits are used
/// when converting between:
/// - major units (human input/output, e.g. `10.50 USD`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd | Currency::Eur | Currency::Gbp => 2,
        }
    }

    /// Formats an amount with the currency symbol, e.g. `$33.34` or `-$5.00`.
    #[must_use]
    pub fn format(self, amount: MoneyCents) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.symbol(), amount.abs())
        } else {
            format!("{}{amount}", self.symbol())
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl core::str::FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(Currency::try_from(" eur ").unwrap(), Currency::Eur);
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!(Currency::try_from("JPY").is_err());
    }

    #[test]
    fn deserializes_codes_case_insensitively() {
        let parsed: Vec<Currency> = serde_json::from_str(r#"["eur", "Gbp", " USD "]"#).unwrap();
        assert_eq!(parsed, vec![Currency::Eur, Currency::Gbp, Currency::Usd]);
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), r#""EUR""#);

        let err = serde_json::from_str::<Currency>(r#""jpy""#).unwrap_err();
        assert!(err.to_string().contains("unsupported currency: JPY"));
    }

    #[test]
    fn formats_with_symbol() {
        assert_eq!(Currency::Usd.format(MoneyCents::new(3334)), "$33.34");
        assert_eq!(Currency::Eur.format(MoneyCents::new(-500)), "-€5.00");
        assert_eq!(Currency::Gbp.format(MoneyCents::ZERO), "£0.00");
    }
}
