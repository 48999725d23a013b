//! Spending statistics over a classified transaction snapshot.
//!
//! Supplemental aggregations consumed by reporting: total cost per
//! category/subcategory, the same broken down by month, net income over the
//! snapshot and the distinct payment sources. All of them classify through
//! the rule engine on the fly; stored labels are never trusted.

use chrono::Datelike;
use model::period::TimeGranularity;
use model::settings::Settings;
use model::transaction::Transaction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::period::period_label;
use crate::rules::RuleEngine;

/// Subcategory label used when a matching rule assigns none.
const UNSPECIFIED_SUBCATEGORY: &str = "Uncategorized";

/// Total absolute expense for one (category, subcategory) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCost {
    pub category: String,
    pub subcategory: String,
    pub total_cost: Decimal,
}

/// Total absolute expense for one (month, category, subcategory) triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCategoryCost {
    pub year_month: String,
    pub category: String,
    pub subcategory: String,
    pub total_cost: Decimal,
}

/// Computes the absolute expense total per category and subcategory.
/// Rows are sorted by category, then subcategory.
#[instrument(skip(settings, transactions), fields(num_transactions = transactions.len()))]
pub fn category_costs(
    settings: &Settings,
    transactions: &[Transaction],
    year: Option<i32>,
    excluded_categories: &[String],
) -> Vec<CategoryCost> {
    let mut totals: HashMap<(String, String), Decimal> = HashMap::new();
    for (transaction, category, subcategory) in
        classified_expenses(settings, transactions, year, excluded_categories)
    {
        *totals.entry((category, subcategory)).or_insert(Decimal::ZERO) +=
            transaction.amount().abs();
    }

    let mut rows: Vec<CategoryCost> = totals
        .into_iter()
        .map(|((category, subcategory), total_cost)| CategoryCost {
            category,
            subcategory,
            total_cost,
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.category.as_str(), a.subcategory.as_str())
            .cmp(&(b.category.as_str(), b.subcategory.as_str()))
    });
    debug!(num_rows = rows.len(), "category costs computed");
    rows
}

/// Computes the absolute expense total per month, category and subcategory.
/// Rows are sorted by month, then category, then subcategory.
#[instrument(skip(settings, transactions), fields(num_transactions = transactions.len()))]
pub fn monthly_category_expenses(
    settings: &Settings,
    transactions: &[Transaction],
    year: Option<i32>,
    excluded_categories: &[String],
) -> Vec<MonthlyCategoryCost> {
    let mut totals: HashMap<(String, String, String), Decimal> = HashMap::new();
    for (transaction, category, subcategory) in
        classified_expenses(settings, transactions, year, excluded_categories)
    {
        let year_month = period_label(transaction.date(), TimeGranularity::Monthly);
        *totals
            .entry((year_month, category, subcategory))
            .or_insert(Decimal::ZERO) += transaction.amount().abs();
    }

    let mut rows: Vec<MonthlyCategoryCost> = totals
        .into_iter()
        .map(
            |((year_month, category, subcategory), total_cost)| MonthlyCategoryCost {
                year_month,
                category,
                subcategory,
                total_cost,
            },
        )
        .collect();
    rows.sort_by(|a, b| {
        (a.year_month.as_str(), a.category.as_str(), a.subcategory.as_str()).cmp(&(
            b.year_month.as_str(),
            b.category.as_str(),
            b.subcategory.as_str(),
        ))
    });
    rows
}

/// Signed sum over the whole snapshot (income positive, expenses negative).
pub fn net_income(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(Transaction::amount).sum()
}

/// Distinct payment-source labels in first-seen order.
pub fn payment_sources(transactions: &[Transaction]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for transaction in transactions {
        if !seen.iter().any(|source| source == transaction.payment_source()) {
            seen.push(transaction.payment_source().to_string());
        }
    }
    seen
}

/// Classifies the snapshot and yields the expense rows that survive the year
/// and exclusion filters, with the subcategory filled in for grouping.
fn classified_expenses<'a>(
    settings: &Settings,
    transactions: &'a [Transaction],
    year: Option<i32>,
    excluded_categories: &[String],
) -> Vec<(&'a Transaction, String, String)> {
    let engine = RuleEngine::from_settings(settings);
    let mut rows = Vec::new();
    for transaction in transactions {
        if year.is_some_and(|year| transaction.date().year() != year) {
            continue;
        }
        if !transaction.is_expense() {
            continue;
        }
        let (category, subcategory) = engine.categorize(transaction);
        if excluded_categories.contains(&category) {
            continue;
        }
        let subcategory = subcategory.unwrap_or_else(|| UNSPECIFIED_SUBCATEGORY.to_string());
        rows.push((transaction, category, subcategory));
    }
    rows
}
