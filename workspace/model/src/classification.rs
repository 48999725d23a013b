use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operator name of a condition.
///
/// The set is closed, but user configuration is free-form: an operator the
/// engine does not know deserializes to [`RuleType::Unknown`] and evaluates to
/// "no match" instead of failing the whole configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RuleType {
    // Text operators (Description and other free-text fields).
    Contains,
    Exact,
    StartsWith,
    EndsWith,
    // Numeric-capable operators.
    Equals,
    GreaterThan,
    LessThan,
    // Date operators.
    Equal,
    Before,
    After,
    Range,
    // Set-membership operators (Payment Source).
    In,
    NotIn,
    Unknown,
}

impl From<String> for RuleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "contains" => RuleType::Contains,
            "exact" => RuleType::Exact,
            "starts_with" => RuleType::StartsWith,
            "ends_with" => RuleType::EndsWith,
            "equals" => RuleType::Equals,
            "greater_than" => RuleType::GreaterThan,
            "less_than" => RuleType::LessThan,
            "equal" => RuleType::Equal,
            "before" => RuleType::Before,
            "after" => RuleType::After,
            "range" => RuleType::Range,
            "in" => RuleType::In,
            "not_in" => RuleType::NotIn,
            _ => RuleType::Unknown,
        }
    }
}

/// How the conditions of a rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// The comparison value of a condition.
///
/// The shape depends on the operator: plain text or a number for the scalar
/// operators, a list for set membership, a start/end pair for ranges. A shape
/// that does not fit the operator is not an error; the condition simply does
/// not match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Text(String),
    Number(Decimal),
    List(Vec<String>),
    Range { start: String, end: String },
}

/// One atomic test within a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub rule_type: RuleType,
    pub value: ConditionValue,
}

/// A classification rule: a category outcome plus a boolean combination of
/// conditions. Rules are evaluated in declaration order and the first match
/// wins; there is no priority beyond order.
///
/// Deserialization also accepts the legacy single-condition shape
/// `{category, subcategory?, rule_type, value, note?}`, which is upgraded to a
/// one-condition AND rule on the `Description` field. The engine only ever
/// sees canonical rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleRepr")]
pub struct Rule {
    pub category: String,
    pub subcategory: Option<String>,
    pub logical_operator: LogicalOperator,
    pub conditions: Vec<Condition>,
    pub note: Option<String>,
}

impl Rule {
    /// Creates a canonical AND rule without subcategory or note.
    pub fn new(category: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            category: category.into(),
            subcategory: None,
            logical_operator: LogicalOperator::And,
            conditions,
            note: None,
        }
    }
}

/// Wire representations of a rule. The canonical shape is tried first; a rule
/// without a `conditions` array falls back to the legacy shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleRepr {
    Canonical {
        category: String,
        #[serde(default)]
        subcategory: Option<String>,
        #[serde(default)]
        logical_operator: LogicalOperator,
        conditions: Vec<Condition>,
        #[serde(default)]
        note: Option<String>,
    },
    Legacy {
        category: String,
        #[serde(default)]
        subcategory: Option<String>,
        rule_type: RuleType,
        value: ConditionValue,
        #[serde(default)]
        note: Option<String>,
    },
}

impl From<RuleRepr> for Rule {
    fn from(repr: RuleRepr) -> Self {
        match repr {
            RuleRepr::Canonical {
                category,
                subcategory,
                logical_operator,
                conditions,
                note,
            } => Rule {
                category,
                subcategory,
                logical_operator,
                conditions,
                note,
            },
            RuleRepr::Legacy {
                category,
                subcategory,
                rule_type,
                value,
                note,
            } => Rule {
                category,
                subcategory,
                logical_operator: LogicalOperator::And,
                conditions: vec![Condition {
                    field: "Description".to_string(),
                    rule_type,
                    value,
                }],
                note,
            },
        }
    }
}
