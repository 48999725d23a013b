use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::category::Category;
use crate::classification::Rule;

/// The full user configuration for one scope: categories, classification
/// rules and budgets.
///
/// Settings are edited wholesale: the host replaces the entire set for a
/// scope, there are no partial-patch semantics. Every collection tolerates
/// being absent in stored configuration, and the per-item legacy shapes
/// (bare category names, single-condition rules) are upgraded during
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{ConditionValue, LogicalOperator, RuleType};
    use rust_decimal::Decimal;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let settings: Settings = serde_json::from_str(r#"{"categories": []}"#).unwrap();
        assert!(settings.categories.is_empty());
        assert!(settings.rules.is_empty());
        assert!(settings.budgets.is_empty());
    }

    #[test]
    fn test_mixed_legacy_configuration_is_upgraded() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "categories": [
                    "Groceries",
                    {"name": "Dining", "subcategories": ["Coffee"]}
                ],
                "rules": [
                    {"category": "Dining", "rule_type": "contains", "value": "coffee"},
                    {
                        "category": "Groceries",
                        "logical_operator": "OR",
                        "conditions": [
                            {"field": "Description", "rule_type": "contains", "value": "market"},
                            {"field": "Description", "rule_type": "contains", "value": "grocer"}
                        ]
                    }
                ],
                "budgets": [
                    {"category": "Dining", "amount": 50, "year": 2024, "months": [3]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(settings.categories.len(), 2);
        assert_eq!(settings.categories[0].name, "Groceries");
        assert!(settings.categories[0].subcategories.is_empty());
        assert_eq!(settings.categories[1].subcategories, vec!["Coffee"]);

        let legacy = &settings.rules[0];
        assert_eq!(legacy.logical_operator, LogicalOperator::And);
        assert_eq!(legacy.conditions.len(), 1);
        assert_eq!(legacy.conditions[0].field, "Description");
        assert_eq!(legacy.conditions[0].rule_type, RuleType::Contains);
        assert_eq!(
            legacy.conditions[0].value,
            ConditionValue::Text("coffee".to_string())
        );

        assert_eq!(settings.rules[1].conditions.len(), 2);
        assert_eq!(settings.budgets[0].amount, Decimal::from(50));
        assert_eq!(settings.budgets[0].year, Some(2024));
    }
}
