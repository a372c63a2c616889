//! The analytics engine.
//!
//! Turns raw transaction rows into period-scoped overview summaries,
//! category breakdowns with percentages, time-bucketed trend series, and
//! derived insights with a financial health grade. Every report is
//! parameterized by the owner and is read-only: a report call issues its
//! store queries, computes, and returns, holding no state between calls.
//! Store failures propagate unchanged; a failing sub-query fails the whole
//! report.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    models::{DatabaseID, TransactionKind, UserID},
    stores::{CategoryStore, TransactionQuery, TransactionStore},
};

mod aggregation;
pub mod insights;

use aggregation::round2;
pub use insights::{HealthScore, Insight, InsightSeverity};

/// The earliest date a report covers when the caller does not supply one.
pub const APP_EPOCH: Date = time::macros::date!(2020 - 01 - 01);

/// Totals for a period of a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// Summed income over the period.
    pub total_income: f64,
    /// Summed expenses over the period.
    pub total_expense: f64,
    /// `total_income - total_expense`. May be negative.
    pub savings: f64,
    /// Savings as a percentage of income, rounded to two decimal places.
    ///
    /// Zero when there is no income; may exceed 100 and is never clamped.
    pub savings_rate: f64,
    /// The number of transactions in the period.
    pub transaction_count: u64,
}

/// One category's share of a period, as produced by [category_breakdown].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// The category's database ID.
    pub category_id: DatabaseID,
    /// The category's display name.
    pub category_name: String,
    /// Whether the category tracks income or expenses.
    pub kind: TransactionKind,
    /// Summed amount of the user's transactions in this category.
    pub total_amount: f64,
    /// Number of the user's transactions in this category.
    pub transaction_count: u64,
    /// Share of total expenses, as a percentage rounded to two decimal
    /// places. Always zero for income categories.
    pub percentage: f64,
}

/// Income and expense totals for one time bucket, as produced by
/// [spending_trends].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// The bucket label, e.g. `2024-01` for a monthly bucket.
    pub period: String,
    /// Summed income in the bucket.
    pub income: f64,
    /// Summed expenses in the bucket.
    pub expense: f64,
    /// `income - expense` for the bucket.
    pub savings: f64,
    /// Number of transactions in the bucket.
    pub transaction_count: u64,
}

/// The bucket width used by [spending_trends].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    /// One bucket per calendar day.
    Daily,
    /// One bucket per ISO week, starting Monday.
    Weekly,
    /// One bucket per calendar month.
    #[default]
    Monthly,
}

/// The number of buckets [spending_trends] looks back when the caller does
/// not say.
pub const DEFAULT_TREND_WINDOW: u32 = 6;

/// Derived observations for a period, as produced by [financial_insights].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    /// The insights whose rules fired for this period.
    pub insights: Vec<Insight>,
    /// Name of the expense category with the largest total, or
    /// `"No expenses"` when the period has none.
    pub highest_spending_category: String,
    /// Total expenses divided by a fixed 30-day period, rounded to two
    /// decimal places; zero when there are no expenses.
    pub average_daily_spending: f64,
    /// Letter grade derived from the savings rate.
    pub financial_health: HealthScore,
}

/// The sentinel reported when a period has no expense categories.
const NO_EXPENSES: &str = "No expenses";

fn validate_range(from: Date, to: Date) -> Result<(), Error> {
    if from > to {
        return Err(Error::InvalidDateRange { from, to });
    }

    Ok(())
}

/// Compute the income/expense totals for `user_id`'s transactions dated
/// within `from..=to`.
///
/// # Errors
/// Returns [Error::InvalidDateRange] if `from` is after `to`, or the store's
/// error if the transactions could not be read.
pub fn overview<T>(transactions: &T, user_id: UserID, from: Date, to: Date) -> Result<Overview, Error>
where
    T: TransactionStore,
{
    validate_range(from, to)?;

    let rows = transactions.get_query(TransactionQuery::for_user(user_id).date_range(from..=to))?;

    let (total_income, total_expense) = aggregation::sum_by_kind(&rows);
    let savings = total_income - total_expense;
    let savings_rate = if total_income > 0.0 {
        round2(savings / total_income * 100.0)
    } else {
        0.0
    };

    Ok(Overview {
        total_income,
        total_expense,
        savings,
        savings_rate,
        transaction_count: rows.len() as u64,
    })
}

/// Break `user_id`'s transactions within `from..=to` down by category.
///
/// Every category visible to the user (global defaults plus their own) is
/// joined against the period's transactions; categories with no amount are
/// omitted. Expense categories report their share of the period's total
/// expenses; income categories report a share of zero. Rows are ordered by
/// total amount descending, tied rows by category ID ascending.
///
/// # Errors
/// Returns [Error::InvalidDateRange] if `from` is after `to`, or the store's
/// error if the categories or transactions could not be read.
pub fn category_breakdown<C, T>(
    categories: &C,
    transactions: &T,
    user_id: UserID,
    from: Date,
    to: Date,
) -> Result<Vec<CategoryBreakdown>, Error>
where
    C: CategoryStore,
    T: TransactionStore,
{
    validate_range(from, to)?;

    let visible = categories.get_for_user(user_id)?;
    let rows = transactions.get_query(TransactionQuery::for_user(user_id).date_range(from..=to))?;

    let total_expenses: f64 = rows
        .iter()
        .filter(|transaction| transaction.kind() == TransactionKind::Expense)
        .map(|transaction| transaction.amount())
        .sum();

    Ok(aggregation::breakdown_by_category(
        &visible,
        &rows,
        total_expenses,
    ))
}

/// Bucket `user_id`'s recent transactions into a trend series.
///
/// The series covers a trailing window of `window` buckets of width `period`
/// ending at `today`; buckets with no transactions are absent from the
/// output. Points are ordered ascending by bucket date.
///
/// # Errors
/// Returns the store's error if the transactions could not be read.
pub fn spending_trends<T>(
    transactions: &T,
    user_id: UserID,
    period: TrendPeriod,
    window: u32,
    today: Date,
) -> Result<Vec<TrendPoint>, Error>
where
    T: TransactionStore,
{
    let start = aggregation::window_start(today, period, window);

    let rows = transactions
        .get_query(TransactionQuery::for_user(user_id).date_range(start..=Date::MAX))?;

    Ok(aggregation::bucket_by_period(&rows, period))
}

/// Derive insights, key metrics, and a health grade for `user_id`'s
/// transactions within `from..=to`.
///
/// Composes [overview] and [category_breakdown] over the same range, then
/// applies the [insight rules](insights).
///
/// # Errors
/// Returns [Error::InvalidDateRange] if `from` is after `to`, or the store's
/// error if the underlying reports could not be computed.
pub fn financial_insights<C, T>(
    categories: &C,
    transactions: &T,
    user_id: UserID,
    from: Date,
    to: Date,
) -> Result<InsightsReport, Error>
where
    C: CategoryStore,
    T: TransactionStore,
{
    let overview = overview(transactions, user_id, from, to)?;
    let breakdown = category_breakdown(categories, transactions, user_id, from, to)?;

    let highest_spending = breakdown
        .iter()
        .find(|row| row.kind == TransactionKind::Expense);

    let mut report_insights = Vec::new();
    report_insights.extend(insights::savings_rate_insight(overview.savings_rate));
    if let Some(top) = highest_spending {
        report_insights.extend(insights::concentration_insight(
            &top.category_name,
            top.percentage,
        ));
    }
    report_insights.extend(insights::frequency_insight(overview.transaction_count));

    let average_daily_spending = if overview.total_expense > 0.0 {
        round2(overview.total_expense / insights::AVERAGE_PERIOD_DAYS)
    } else {
        0.0
    };

    Ok(InsightsReport {
        insights: report_insights,
        highest_spending_category: highest_spending
            .map(|row| row.category_name.clone())
            .unwrap_or_else(|| NO_EXPENSES.to_string()),
        average_daily_spending,
        financial_health: HealthScore::from_savings_rate(overview.savings_rate),
    })
}
