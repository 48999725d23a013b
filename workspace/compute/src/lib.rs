pub mod budget;
pub mod error;
pub mod period;
pub mod reconciliation;
pub mod rules;
pub mod stats;

use chrono::NaiveDate;
use model::settings::Settings;
use model::transaction::Transaction;

pub use error::{ComputeError, Result};
use reconciliation::{BudgetComparison, BudgetComparisonRow, ReconciliationParams};
use rules::RuleEngine;

/// Classifies every transaction in the snapshot with the configured rules,
/// writing category/subcategory back onto the records.
///
/// This is the entry point hosts call before persisting updated labels.
/// Classification is re-derived from the current rule set on every call.
pub fn classify_transactions(settings: &Settings, transactions: &mut [Transaction]) {
    RuleEngine::from_settings(settings).apply(transactions);
}

/// Reconciles actual spending against budgets over a window of historical
/// periods.
///
/// This function uses the provided date as "today" or the current date if
/// none is provided; a fixed `params.year` overrides the anchor entirely.
pub fn compare_budgets(
    settings: &Settings,
    transactions: &[Transaction],
    params: &ReconciliationParams,
    today: Option<NaiveDate>,
) -> Result<Vec<BudgetComparisonRow>> {
    BudgetComparison::new(settings).compute(transactions, params, today)
}
