use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a single raw transaction as supplied by the host system.
///
/// The `category` and `subcategory` fields are derived: they are written by the
/// rule engine and are absent until classification runs. Stored labels are
/// never treated as ground truth since the rule set may change between reads,
/// so they are always recomputed from the current rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    amount: Decimal,
    payment_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subcategory: Option<String>,
}

impl Transaction {
    /// Creates a new unclassified Transaction.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        payment_source: impl Into<String>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            payment_source: payment_source.into(),
            category: None,
            subcategory: None,
        }
    }

    /// Gets the date of the transaction.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Gets the free-text description of the transaction.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Gets the signed amount of the transaction.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Gets the payment-source label of the transaction.
    pub fn payment_source(&self) -> &str {
        &self.payment_source
    }

    /// Gets the assigned category, if classification has run.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Gets the assigned subcategory, if any.
    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    /// Writes the derived classification labels onto the transaction.
    pub fn set_classification(&mut self, category: String, subcategory: Option<String>) {
        self.category = Some(category);
        self.subcategory = subcategory;
    }

    /// Checks if the transaction is an expense (negative amount).
    /// A non-negative amount is treated as income.
    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

/// A single typed value read from a transaction field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Number(Decimal),
    Text(String),
}

impl FieldValue {
    /// Renders the value as text, for string-based comparisons.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Text(text) => text.clone(),
        }
    }
}

/// Canonical form of a field name: lowercase with spaces collapsed to
/// underscores, so "Payment Source", "payment source" and "payment_source"
/// all address the same field.
pub fn normalize_field_name(field: &str) -> String {
    field.trim().to_lowercase().replace(' ', "_")
}

/// Typed accessor over heterogeneous transaction representations.
///
/// Rule conditions address fields by name; the concrete record may be a
/// [`Transaction`] or a label-keyed snapshot (e.g. a raw CSV row). Each
/// representation implements the lookup once, and the rule engine never
/// branches on the shape of the record. A missing field is `None`, never an
/// error.
pub trait FieldLookup {
    /// Returns the value of the named field, or `None` if the record has no
    /// such field or the field is unset.
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

impl FieldLookup for Transaction {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match normalize_field_name(field).as_str() {
            "date" => Some(FieldValue::Date(self.date)),
            "description" => Some(FieldValue::Text(self.description.clone())),
            "amount" => Some(FieldValue::Number(self.amount)),
            "payment_source" => Some(FieldValue::Text(self.payment_source.clone())),
            "category" => self.category.clone().map(FieldValue::Text),
            "subcategory" => self.subcategory.clone().map(FieldValue::Text),
            _ => None,
        }
    }
}

/// Label-keyed snapshot, e.g. a row read straight out of a CSV import.
/// Values are untyped text; the rule engine coerces as needed.
impl FieldLookup for HashMap<String, String> {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let wanted = normalize_field_name(field);
        self.iter()
            .find(|(key, _)| normalize_field_name(key) == wanted)
            .map(|(_, value)| FieldValue::Text(value.clone()))
    }
}
