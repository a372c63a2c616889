//! Insight rules: pure functions mapping aggregated metrics to qualitative
//! insight records and a letter health grade.
//!
//! The rules are independent and order-insensitive; any number of them can
//! fire for the same period, and none of them perform I/O.

use std::fmt::Display;

use serde::{Serialize, Serializer};

/// How many days of a reporting period the per-day averages assume.
///
/// Averages and the frequency rule divide by this constant regardless of the
/// actual range length.
pub const AVERAGE_PERIOD_DAYS: f64 = 30.0;

/// How loud an insight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    /// Good news worth celebrating.
    Positive,
    /// Something the user should act on.
    Warning,
    /// Neutral observation about spending patterns.
    Info,
}

/// A qualitative observation derived from a period's aggregated metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    /// How loud the insight is.
    pub severity: InsightSeverity,
    /// Short headline for the insight.
    pub title: String,
    /// Human-readable explanation with the numbers that triggered it.
    pub message: String,
}

/// The savings-rate rule.
///
/// A rate of at least 30% earns a positive insight and a rate of at most 10%
/// a warning. The open band between the two thresholds is deliberately
/// silent.
pub fn savings_rate_insight(savings_rate: f64) -> Option<Insight> {
    if savings_rate >= 30.0 {
        Some(Insight {
            severity: InsightSeverity::Positive,
            title: "Excellent Savings".to_string(),
            message: format!("Your savings rate is {savings_rate}% - keep it up!"),
        })
    } else if savings_rate <= 10.0 {
        Some(Insight {
            severity: InsightSeverity::Warning,
            title: "Low Savings Rate".to_string(),
            message: format!("Your savings rate is {savings_rate}%. Consider reducing expenses."),
        })
    } else {
        None
    }
}

/// The spending-concentration rule: fires when the top expense category takes
/// more than 40% of total expenses.
pub fn concentration_insight(category_name: &str, percentage: f64) -> Option<Insight> {
    if percentage > 40.0 {
        Some(Insight {
            severity: InsightSeverity::Info,
            title: "High Spending Concentration".to_string(),
            message: format!(
                "You're spending {percentage}% of your expenses on {category_name}."
            ),
        })
    } else {
        None
    }
}

/// The transaction-frequency rule: fires when the period averages more than
/// three transactions per day (over the fixed [AVERAGE_PERIOD_DAYS] window).
pub fn frequency_insight(transaction_count: u64) -> Option<Insight> {
    if transaction_count as f64 / AVERAGE_PERIOD_DAYS > 3.0 {
        Some(Insight {
            severity: InsightSeverity::Info,
            title: "Frequent Transactions".to_string(),
            message: format!("You're making {transaction_count} transactions this period."),
        })
    } else {
        None
    }
}

/// A letter grade summarizing financial health, derived from the savings
/// rate.
///
/// Variants are declared worst-first so that the derived ordering ranks
/// grades by quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthScore {
    /// Spending meets or exceeds income.
    Critical,
    /// Saving something, but less than 10% of income.
    NeedsImprovement,
    /// Saving at least 10% of income.
    Average,
    /// Saving at least 20% of income.
    Good,
    /// Saving at least 30% of income.
    Excellent,
}

impl HealthScore {
    /// Grade a savings rate against the fixed thresholds.
    pub fn from_savings_rate(savings_rate: f64) -> Self {
        if savings_rate >= 30.0 {
            HealthScore::Excellent
        } else if savings_rate >= 20.0 {
            HealthScore::Good
        } else if savings_rate >= 10.0 {
            HealthScore::Average
        } else if savings_rate > 0.0 {
            HealthScore::NeedsImprovement
        } else {
            HealthScore::Critical
        }
    }

    /// The letter-grade string reported to clients.
    pub fn grade(&self) -> &'static str {
        match self {
            HealthScore::Excellent => "A - Excellent",
            HealthScore::Good => "B - Good",
            HealthScore::Average => "C - Average",
            HealthScore::NeedsImprovement => "D - Needs Improvement",
            HealthScore::Critical => "F - Critical",
        }
    }
}

impl Display for HealthScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grade())
    }
}

impl Serialize for HealthScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.grade())
    }
}
