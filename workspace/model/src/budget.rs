use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel category meaning "the blanket budget across every category".
pub const ALL_CATEGORIES: &str = "ALL_CATEGORIES";

/// One budget entry of the user configuration.
///
/// Scoping depends on which optional fields are set:
/// - `year` and non-empty `months`: a specific-month budget, `amount` applies
///   to each listed month of that year;
/// - `year` alone: a whole-year budget, `amount` is the annual total;
/// - neither: a recurring default, `amount` is a standing monthly figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub months: Option<Vec<u32>>,
}

impl Budget {
    /// True when no month scoping applies (the `months` field is absent or an
    /// empty list; both mean the same thing).
    pub fn months_unset(&self) -> bool {
        self.months.as_ref().is_none_or(|months| months.is_empty())
    }

    /// True when this entry covers the given month of its year.
    pub fn covers_month(&self, month: u32) -> bool {
        self.months
            .as_ref()
            .is_some_and(|months| months.contains(&month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_scoping() {
        let specific: Budget = serde_json::from_str(
            r#"{"category": "Food", "amount": 100, "year": 2024, "months": [3, 4]}"#,
        )
        .unwrap();
        assert!(specific.covers_month(3));
        assert!(!specific.covers_month(5));
        assert!(!specific.months_unset());

        let whole_year: Budget =
            serde_json::from_str(r#"{"category": "Food", "amount": 1200, "year": 2024}"#).unwrap();
        assert!(whole_year.months_unset());
        assert!(!whole_year.covers_month(3));

        // An explicit empty list means the same as an absent field.
        let empty_months: Budget = serde_json::from_str(
            r#"{"category": "Food", "amount": 1200, "year": 2024, "months": []}"#,
        )
        .unwrap();
        assert!(empty_months.months_unset());
    }

    #[test]
    fn test_recurring_default_shape() {
        let recurring: Budget =
            serde_json::from_str(r#"{"category": "Food", "amount": 50}"#).unwrap();
        assert!(recurring.year.is_none());
        assert!(recurring.months_unset());
        assert_eq!(recurring.amount, Decimal::from(50));
    }
}
