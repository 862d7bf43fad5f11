//! Recurrence used by fixed expenses and by the user's income frequency.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Periodicity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Normalizes an amount charged once per period to a monthly figure.
    ///
    /// Weekly amounts use 52 weeks per year. Results are truncated toward zero.
    pub fn monthly_equivalent(self, amount_minor: i64) -> i64 {
        match self {
            Self::Weekly => amount_minor.saturating_mul(52) / 12,
            Self::Monthly => amount_minor,
            Self::Yearly => amount_minor / 12,
        }
    }
}

impl TryFrom<&str> for Periodicity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::validation(
                "periodicity",
                format!("invalid periodicity: {other}"),
            )),
        }
    }
}
