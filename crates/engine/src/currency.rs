use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Three-letter currency code attached to users, wallets and fixed expenses.
///
/// Codes are stored upper-cased (`usd` → `USD`). No conversion between
/// currencies is ever performed; the code is descriptive except for transfers,
/// which require both wallets to share it.
///
/// ## Minor units
///
/// Every monetary value is an `i64` number of **minor units** (cents), so
/// `10.50 USD` is stored as `1050`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("USD".to_string())
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(EngineError::validation(
                "currency",
                format!("unsupported currency: {value}"),
            ));
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let currency = Currency::try_from(" eur ").unwrap();
        assert_eq!(currency.code(), "EUR");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(Currency::try_from("EURO").is_err());
        assert!(Currency::try_from("E1R").is_err());
        assert!(Currency::try_from("").is_err());
    }

    #[test]
    fn defaults_to_usd() {
        assert_eq!(Currency::default().to_string(), "USD");
    }
}
