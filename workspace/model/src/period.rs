use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Calendar bucket size used for budget reconciliation.
///
/// The set is closed: an unsupported granularity cannot be represented once
/// parsed. Parsing an unknown spelling is a fatal configuration error, not a
/// recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeGranularity {
    Weekly,
    Monthly,
    Quarterly,
    #[serde(rename = "Half-Yearly")]
    HalfYearly,
    Yearly,
}

impl TimeGranularity {
    /// The canonical spelling, as used in configuration and query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGranularity::Weekly => "Weekly",
            TimeGranularity::Monthly => "Monthly",
            TimeGranularity::Quarterly => "Quarterly",
            TimeGranularity::HalfYearly => "Half-Yearly",
            TimeGranularity::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a granularity string has no known spelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported time granularity: {0}")]
pub struct ParseGranularityError(pub String);

impl FromStr for TimeGranularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Weekly" => Ok(TimeGranularity::Weekly),
            "Monthly" => Ok(TimeGranularity::Monthly),
            "Quarterly" => Ok(TimeGranularity::Quarterly),
            "Half-Yearly" => Ok(TimeGranularity::HalfYearly),
            "Yearly" => Ok(TimeGranularity::Yearly),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_spellings() {
        assert_eq!(
            serde_json::to_string(&TimeGranularity::HalfYearly).unwrap(),
            r#""Half-Yearly""#
        );
        let g: TimeGranularity = serde_json::from_str(r#""Quarterly""#).unwrap();
        assert_eq!(g, TimeGranularity::Quarterly);
    }

    #[test]
    fn test_from_str_round_trip() {
        for g in [
            TimeGranularity::Weekly,
            TimeGranularity::Monthly,
            TimeGranularity::Quarterly,
            TimeGranularity::HalfYearly,
            TimeGranularity::Yearly,
        ] {
            assert_eq!(g.as_str().parse::<TimeGranularity>().unwrap(), g);
        }
    }

    #[test]
    fn test_unknown_spelling_is_an_error() {
        let err = "Fortnightly".parse::<TimeGranularity>().unwrap_err();
        assert_eq!(err, ParseGranularityError("Fortnightly".to_string()));
    }
}
