//! Rule-based transaction classification.
//!
//! Evaluates a transaction against the user's ordered rule list and returns
//! the first matching category/subcategory. Evaluation is a pure function of
//! the rule set and the transaction: no state, no side effects, and a
//! malformed condition never raises; it simply does not match.

use chrono::NaiveDate;
use model::classification::{Condition, ConditionValue, LogicalOperator, Rule, RuleType};
use model::settings::Settings;
use model::transaction::{FieldLookup, FieldValue, Transaction, normalize_field_name};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Category assigned when no rule matches.
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

/// Classifies transactions into (category, subcategory) using an ordered rule
/// list. Rules are expected in canonical form; legacy single-condition shapes
/// are upgraded when the configuration is deserialized.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// Creates an engine over an ordered rule list.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Creates an engine from the rule section of a settings snapshot.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.rules.clone())
    }

    /// Gets the rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classifies a single transaction.
    ///
    /// Iterates the rules in declaration order, combining each rule's
    /// conditions per its logical operator, and returns the first matching
    /// rule's labels. A rule without conditions never matches. If no rule
    /// matches, returns `("UNCATEGORIZED", None)`.
    #[instrument(skip(self, transaction), fields(num_rules = self.rules.len()))]
    pub fn categorize<T: FieldLookup>(&self, transaction: &T) -> (String, Option<String>) {
        for rule in &self.rules {
            if rule.conditions.is_empty() {
                continue;
            }
            let matched = match rule.logical_operator {
                LogicalOperator::And => rule
                    .conditions
                    .iter()
                    .all(|condition| evaluate_condition(transaction, condition)),
                LogicalOperator::Or => rule
                    .conditions
                    .iter()
                    .any(|condition| evaluate_condition(transaction, condition)),
            };
            if matched {
                debug!(category = %rule.category, "transaction matched rule");
                return (rule.category.clone(), rule.subcategory.clone());
            }
        }
        (UNCATEGORIZED.to_string(), None)
    }

    /// Classifies every transaction in place, writing the derived labels back
    /// onto the records. Classification is idempotent and re-derived on every
    /// pass; previously stored labels are ignored.
    pub fn apply(&self, transactions: &mut [Transaction]) {
        for transaction in transactions.iter_mut() {
            let (category, subcategory) = self.categorize(transaction);
            transaction.set_classification(category, subcategory);
        }
    }
}

/// Evaluates one condition against one transaction. Field dispatch follows the
/// field name: `Date` compares dates, `Payment Source` tests set membership,
/// everything else is text with numeric coercion where the operator needs it.
/// Every anomaly (missing field, unparseable value, shape mismatch, unknown
/// operator) resolves to false.
fn evaluate_condition<T: FieldLookup>(transaction: &T, condition: &Condition) -> bool {
    let Some(field_value) = transaction.field_value(&condition.field) else {
        return false;
    };

    match normalize_field_name(&condition.field).as_str() {
        "date" => evaluate_date_condition(&field_value, condition),
        "payment_source" => evaluate_membership_condition(&field_value, condition),
        _ => evaluate_text_condition(&field_value, condition),
    }
}

fn evaluate_date_condition(field_value: &FieldValue, condition: &Condition) -> bool {
    let Some(transaction_date) = coerce_date(field_value) else {
        return false;
    };

    match condition.rule_type {
        RuleType::Equal => {
            condition_date(&condition.value).is_some_and(|rule_date| transaction_date == rule_date)
        }
        RuleType::Before => {
            condition_date(&condition.value).is_some_and(|rule_date| transaction_date < rule_date)
        }
        RuleType::After => {
            condition_date(&condition.value).is_some_and(|rule_date| transaction_date > rule_date)
        }
        RuleType::Range => match &condition.value {
            ConditionValue::Range { start, end } => {
                match (parse_date_text(start), parse_date_text(end)) {
                    (Some(start), Some(end)) => {
                        // Inclusive on both ends.
                        start <= transaction_date && transaction_date <= end
                    }
                    _ => false,
                }
            }
            _ => false,
        },
        _ => false,
    }
}

fn evaluate_membership_condition(field_value: &FieldValue, condition: &Condition) -> bool {
    // Exact string equality against the allowed list, no case normalization.
    let ConditionValue::List(allowed) = &condition.value else {
        return false;
    };
    let text = field_value.as_text();

    match condition.rule_type {
        RuleType::In => allowed.iter().any(|entry| *entry == text),
        RuleType::NotIn => !allowed.iter().any(|entry| *entry == text),
        _ => false,
    }
}

fn evaluate_text_condition(field_value: &FieldValue, condition: &Condition) -> bool {
    let Some(rule_text) = condition_text(&condition.value) else {
        return false;
    };
    let transaction_text = field_value.as_text();

    match condition.rule_type {
        RuleType::Contains => transaction_text
            .to_lowercase()
            .contains(&rule_text.to_lowercase()),
        RuleType::Exact => transaction_text.to_lowercase() == rule_text.to_lowercase(),
        RuleType::StartsWith => transaction_text
            .to_lowercase()
            .starts_with(&rule_text.to_lowercase()),
        RuleType::EndsWith => transaction_text
            .to_lowercase()
            .ends_with(&rule_text.to_lowercase()),
        RuleType::Equals => {
            // Numeric equality first, case-insensitive text equality as the
            // fallback when either side does not coerce.
            match (coerce_decimal(field_value), condition_decimal(&condition.value)) {
                (Some(left), Some(right)) => left == right,
                _ => transaction_text.to_lowercase() == rule_text.to_lowercase(),
            }
        }
        RuleType::GreaterThan => {
            match (coerce_decimal(field_value), condition_decimal(&condition.value)) {
                (Some(left), Some(right)) => left > right,
                _ => false,
            }
        }
        RuleType::LessThan => {
            match (coerce_decimal(field_value), condition_decimal(&condition.value)) {
                (Some(left), Some(right)) => left < right,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Textual date formats accepted in transaction snapshots and rule values.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

fn coerce_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(date) => Some(*date),
        FieldValue::Text(text) => parse_date_text(text),
        FieldValue::Number(_) => None,
    }
}

fn condition_date(value: &ConditionValue) -> Option<NaiveDate> {
    match value {
        ConditionValue::Text(text) => parse_date_text(text),
        _ => None,
    }
}

fn coerce_decimal(value: &FieldValue) -> Option<Decimal> {
    match value {
        FieldValue::Number(number) => Some(*number),
        FieldValue::Text(text) => Decimal::from_str(text.trim()).ok(),
        FieldValue::Date(_) => None,
    }
}

/// Scalar condition value as text; lists and ranges have no scalar rendering.
fn condition_text(value: &ConditionValue) -> Option<String> {
    match value {
        ConditionValue::Text(text) => Some(text.clone()),
        ConditionValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn condition_decimal(value: &ConditionValue) -> Option<Decimal> {
    match value {
        ConditionValue::Number(number) => Some(*number),
        ConditionValue::Text(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}
