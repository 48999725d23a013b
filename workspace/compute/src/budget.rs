//! Budget resolution through the priority cascade.
//!
//! Resolves the amount that applies to a (category, year, month) query. The
//! monthly cascade is the single source of truth; a yearly query is the sum
//! of its twelve monthly resolutions.

use model::budget::Budget;
use rust_decimal::Decimal;
use tracing::instrument;

/// Resolves the budgeted amount for a category in a given period.
///
/// With a month, the cascade runs over the budget rows in declaration order:
/// 1. exact row for that category, year and month: the amount as-is;
/// 2. whole-year row for that category and year: the annual total spread
///    evenly (`amount / 12`);
/// 3. recurring default for that category (no year, no months): the amount
///    as a standing monthly figure;
/// 4. otherwise zero.
///
/// Without a month (a yearly query), the twelve monthly resolutions are
/// summed. The first matching row wins within each step; overlapping or
/// duplicate rows are not detected.
#[instrument(skip(budgets), fields(num_budgets = budgets.len()))]
pub fn budget_for_period(
    budgets: &[Budget],
    category: &str,
    year: i32,
    month: Option<u32>,
) -> Decimal {
    match month {
        Some(month) => monthly_budget(budgets, category, year, month),
        None => (1..=12)
            .map(|month| monthly_budget(budgets, category, year, month))
            .sum(),
    }
}

fn monthly_budget(budgets: &[Budget], category: &str, year: i32, month: u32) -> Decimal {
    if let Some(exact) = budgets
        .iter()
        .find(|b| b.category == category && b.year == Some(year) && b.covers_month(month))
    {
        return exact.amount;
    }

    if let Some(whole_year) = budgets
        .iter()
        .find(|b| b.category == category && b.year == Some(year) && b.months_unset())
    {
        return whole_year.amount / Decimal::from(12);
    }

    if let Some(recurring) = budgets
        .iter()
        .find(|b| b.category == category && b.year.is_none() && b.months_unset())
    {
        return recurring.amount;
    }

    Decimal::ZERO
}
