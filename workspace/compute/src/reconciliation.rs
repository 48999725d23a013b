//! Budget-versus-actual reconciliation.
//!
//! Produces the per-period comparison table consumed by reporting: for each
//! historical period, the budgeted amount for the selected category scope,
//! the actual (absolute-valued, expense-only) spending, the difference and an
//! over-budget flag. Classification, calendar bucketing and budget resolution
//! are delegated to the other modules; this one is a single linear
//! aggregation pass over the transaction snapshot.

use chrono::{Datelike, NaiveDate, Utc};
use model::budget::{ALL_CATEGORIES, Budget};
use model::period::TimeGranularity;
use model::settings::Settings;
use model::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::budget::budget_for_period;
use crate::error::{ComputeError, Result};
use crate::period::{parse_label, period_label, periods_in_range};
use crate::rules::RuleEngine;

/// Aggregation label used when more than one category is selected.
pub const TOTAL_SELECTED_CATEGORIES: &str = "Total Selected Categories";

/// Query parameters for one reconciliation request.
///
/// `categories` entries may be scoped to a subcategory with the `"Main:Sub"`
/// form. An empty list (or one containing the `ALL_CATEGORIES` sentinel)
/// selects everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationParams {
    pub categories: Vec<String>,
    pub excluded_categories: Vec<String>,
    pub granularity: TimeGranularity,
    pub num_periods: usize,
    pub year: Option<i32>,
}

impl Default for ReconciliationParams {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            excluded_categories: Vec::new(),
            granularity: TimeGranularity::Monthly,
            num_periods: 12,
            year: None,
        }
    }
}

/// One reconciled (period, category scope) record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetComparisonRow {
    pub period: String,
    pub category: String,
    pub budgeted_amount: Decimal,
    pub actual_expenses: Decimal,
    pub difference: Decimal,
    pub over_budget: bool,
}

/// A computer that reconciles actual spending against budgets per period.
///
/// Holds one configuration snapshot (rules, budgets, category names); each
/// [`compute`](BudgetComparison::compute) call is a pure function of that
/// snapshot plus the supplied transactions and parameters.
#[derive(Debug, Clone)]
pub struct BudgetComparison {
    engine: RuleEngine,
    budgets: Vec<Budget>,
    category_names: Vec<String>,
}

impl BudgetComparison {
    /// Creates a computer over one settings snapshot.
    pub fn new(settings: &Settings) -> Self {
        Self {
            engine: RuleEngine::from_settings(settings),
            budgets: settings.budgets.clone(),
            category_names: settings
                .categories
                .iter()
                .map(|category| category.name.clone())
                .collect(),
        }
    }

    /// Computes one comparison row per historical period.
    ///
    /// Periods end at `today` (defaulting to the current date) or, when
    /// `params.year` is fixed, at December 31 of that year. An empty
    /// transaction snapshot is not an error: every row then carries zero
    /// actuals and whatever the budgets resolve to.
    #[instrument(skip(self, transactions, params), fields(
        num_transactions = transactions.len(),
        granularity = %params.granularity,
        num_periods = params.num_periods,
    ))]
    pub fn compute(
        &self,
        transactions: &[Transaction],
        params: &ReconciliationParams,
        today: Option<NaiveDate>,
    ) -> Result<Vec<BudgetComparisonRow>> {
        let select_all = params.categories.is_empty()
            || params.categories.iter().any(|c| c == ALL_CATEGORIES);
        let aggregation_label = if select_all {
            ALL_CATEGORIES.to_string()
        } else if params.categories.len() > 1 {
            TOTAL_SELECTED_CATEGORIES.to_string()
        } else {
            params.categories[0].clone()
        };

        let today = today.unwrap_or_else(|| Utc::now().date_naive());
        let anchor = match params.year {
            Some(year) => NaiveDate::from_ymd_opt(year, 12, 31)
                .ok_or_else(|| ComputeError::Date(format!("invalid year {year}")))?,
            None => today,
        };
        let periods = periods_in_range(anchor, params.granularity, params.num_periods);
        debug!(
            num_periods = periods.len(),
            label = %aggregation_label,
            "generated historical periods"
        );

        let actuals = self.actual_expenses_by_period(transactions, params, select_all);

        // The budget lookup targets the blanket sentinel for an unrestricted
        // selection, otherwise the first selected category.
        let budget_target = if select_all {
            ALL_CATEGORIES
        } else {
            params.categories[0].as_str()
        };

        let mut rows = Vec::with_capacity(periods.len());
        for period in &periods {
            let parsed = parse_label(period, params.granularity)?;
            let target_year = parsed.year();
            // Only a monthly period narrows the budget query to one month;
            // coarser granularities resolve the whole year.
            let target_month = (params.granularity == TimeGranularity::Monthly)
                .then(|| parsed.month());

            let mut budgeted =
                budget_for_period(&self.budgets, budget_target, target_year, target_month);
            if budget_target == ALL_CATEGORIES && budgeted == Decimal::ZERO {
                // No blanket budget defined; fall back to the sum of every
                // individually-defined category. A legitimately-zero blanket
                // budget is indistinguishable from an absent one here.
                budgeted = self
                    .category_names
                    .iter()
                    .map(|name| {
                        budget_for_period(&self.budgets, name, target_year, target_month)
                    })
                    .sum();
            }

            let actual = actuals.get(period).copied().unwrap_or(Decimal::ZERO);
            rows.push(BudgetComparisonRow {
                period: period.clone(),
                category: aggregation_label.clone(),
                budgeted_amount: budgeted,
                actual_expenses: actual,
                difference: budgeted - actual,
                over_budget: actual > budgeted,
            });
        }

        info!(num_rows = rows.len(), "budget comparison computed");
        Ok(rows)
    }

    /// Classifies the snapshot, keeps matching expenses as absolute values
    /// and sums them per period label.
    fn actual_expenses_by_period(
        &self,
        transactions: &[Transaction],
        params: &ReconciliationParams,
        select_all: bool,
    ) -> HashMap<String, Decimal> {
        let selected = parse_selected_categories(&params.categories);

        let mut actuals: HashMap<String, Decimal> = HashMap::new();
        for transaction in transactions {
            if params.year.is_some_and(|year| transaction.date().year() != year) {
                continue;
            }
            if !transaction.is_expense() {
                continue;
            }

            let (category, subcategory) = self.engine.categorize(transaction);
            if params.excluded_categories.contains(&category) {
                continue;
            }
            if !select_all {
                let matches = selected.iter().any(|(main, sub)| match sub {
                    Some(sub) => {
                        category == *main && subcategory.as_deref() == Some(sub.as_str())
                    }
                    None => category == *main,
                });
                if !matches {
                    continue;
                }
            }

            let label = period_label(transaction.date(), params.granularity);
            *actuals.entry(label).or_insert(Decimal::ZERO) += transaction.amount().abs();
        }
        actuals
    }
}

/// Splits selected category entries into (main, optional subcategory) pairs.
fn parse_selected_categories(categories: &[String]) -> Vec<(String, Option<String>)> {
    categories
        .iter()
        .map(|entry| match entry.split_once(':') {
            Some((main, sub)) => (main.trim().to_string(), Some(sub.trim().to_string())),
            None => (entry.trim().to_string(), None),
        })
        .collect()
}
