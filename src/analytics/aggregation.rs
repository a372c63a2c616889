//! Pure aggregation helpers for the analytics reports.
//!
//! These functions turn slices of transactions into summed totals, category
//! breakdown rows, and time-bucketed trend points. They perform no I/O; the
//! functions in the parent module wire them up to the stores.

use std::collections::{BTreeMap, HashMap};

use time::{Date, Duration, Month};

use crate::{
    analytics::{CategoryBreakdown, TrendPeriod, TrendPoint},
    models::{Category, DatabaseID, Transaction, TransactionKind},
};

/// Round a value to two decimal places.
///
/// Applied only at the final formatting step of derived ratios; summed totals
/// are never rounded on the way through.
pub(super) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum transaction amounts, split into (income, expense).
pub(super) fn sum_by_kind(transactions: &[Transaction]) -> (f64, f64) {
    let mut income = 0.0;
    let mut expense = 0.0;

    for transaction in transactions {
        match transaction.kind() {
            TransactionKind::Income => income += transaction.amount(),
            TransactionKind::Expense => expense += transaction.amount(),
        }
    }

    (income, expense)
}

/// Group transactions by category and compute breakdown rows.
///
/// Only categories with a non-zero summed amount appear in the result; this
/// is a filter, not a zero-fill. Expense categories are normalized against
/// `total_expenses` (the share is 0 when `total_expenses` is 0); income
/// categories always report a share of 0.
///
/// Rows are ordered by total amount descending, with category ID ascending
/// as the tiebreaker so that the order is reproducible.
pub(super) fn breakdown_by_category(
    categories: &[Category],
    transactions: &[Transaction],
    total_expenses: f64,
) -> Vec<CategoryBreakdown> {
    let mut totals: HashMap<DatabaseID, (f64, u64)> = HashMap::new();

    for transaction in transactions {
        let entry = totals.entry(transaction.category_id()).or_insert((0.0, 0));
        entry.0 += transaction.amount();
        entry.1 += 1;
    }

    let mut rows: Vec<CategoryBreakdown> = categories
        .iter()
        .filter_map(|category| {
            let &(total_amount, transaction_count) = totals.get(&category.id())?;

            if total_amount <= 0.0 {
                return None;
            }

            let percentage =
                if category.kind() == TransactionKind::Expense && total_expenses > 0.0 {
                    round2(total_amount / total_expenses * 100.0)
                } else {
                    0.0
                };

            Some(CategoryBreakdown {
                category_id: category.id(),
                category_name: category.name().to_string(),
                kind: category.kind(),
                total_amount,
                transaction_count,
                percentage,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_amount
            .partial_cmp(&a.total_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.category_id.cmp(&b.category_id))
    });

    rows
}

/// Truncate a date to the start of its bucket for the given period.
///
/// Days map to themselves, weeks to their Monday, and months to their first
/// day.
pub(super) fn truncate_to_bucket(date: Date, period: TrendPeriod) -> Date {
    match period {
        TrendPeriod::Daily => date,
        TrendPeriod::Weekly => {
            date - Duration::days(date.weekday().number_days_from_monday() as i64)
        }
        TrendPeriod::Monthly => date.replace_day(1).unwrap(),
    }
}

/// Format a bucket's label: `YYYY-MM-DD` for days, `YYYY-Wnn` (ISO week) for
/// weeks, and `YYYY-MM` for months.
pub(super) fn bucket_label(bucket: Date, period: TrendPeriod) -> String {
    match period {
        TrendPeriod::Daily => bucket.to_string(),
        TrendPeriod::Weekly => {
            let (iso_year, iso_week, _) = bucket.to_iso_week_date();
            format!("{iso_year}-W{iso_week:02}")
        }
        TrendPeriod::Monthly => {
            format!("{:04}-{:02}", bucket.year(), u8::from(bucket.month()))
        }
    }
}

/// The start of the trailing window of `window` buckets ending at `today`.
///
/// Daily and weekly windows use fixed 30-day and 4-week approximations of a
/// month; monthly windows step back whole calendar months.
pub(super) fn window_start(today: Date, period: TrendPeriod, window: u32) -> Date {
    match period {
        TrendPeriod::Daily => today - Duration::days(window as i64 * 30),
        TrendPeriod::Weekly => today - Duration::weeks(window as i64 * 4),
        TrendPeriod::Monthly => months_before(today, window),
    }
}

/// The date `months` calendar months before `date`, clamping the day to the
/// length of the target month.
fn months_before(date: Date, months: u32) -> Date {
    let total_months = date.year() * 12 + (u8::from(date.month()) as i32 - 1) - months as i32;
    let year = total_months.div_euclid(12);
    let month = Month::try_from((total_months.rem_euclid(12) + 1) as u8).unwrap();
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).unwrap()
}

/// Group transactions into trend points, one per non-empty bucket.
///
/// Buckets with no transactions are absent from the output rather than
/// zero-filled. Points are ordered ascending by bucket date.
pub(super) fn bucket_by_period(
    transactions: &[Transaction],
    period: TrendPeriod,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<Date, (f64, f64, u64)> = BTreeMap::new();

    for transaction in transactions {
        let bucket = truncate_to_bucket(transaction.date(), period);
        let entry = buckets.entry(bucket).or_insert((0.0, 0.0, 0));

        match transaction.kind() {
            TransactionKind::Income => entry.0 += transaction.amount(),
            TransactionKind::Expense => entry.1 += transaction.amount(),
        }
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .map(|(bucket, (income, expense, transaction_count))| TrendPoint {
            period: bucket_label(bucket, period),
            income,
            expense,
            savings: income - expense,
            transaction_count,
        })
        .collect()
}
