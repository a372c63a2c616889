//! This file defines the API routes for the analytics reports.
//!
//! Each handler resolves the requested date range (defaulting to the app
//! epoch through today), calls the [analytics](crate::analytics) engine, and
//! shapes the JSON response.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    analytics::{
        self, APP_EPOCH, CategoryBreakdown, DEFAULT_TREND_WINDOW, HealthScore, Insight,
        InsightsReport, Overview, TrendPeriod, TrendPoint,
    },
    auth::Claims,
    models::TransactionKind,
    stores::{CategoryStore, TransactionStore, UserStore},
};

/// The date range query parameters shared by the report routes.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    /// The first date the report covers. Defaults to the app epoch.
    pub from: Option<Date>,
    /// The last date the report covers. Defaults to today.
    pub to: Option<Date>,
}

impl RangeParams {
    fn resolve(&self) -> (Date, Date) {
        let today = OffsetDateTime::now_utc().date();

        (self.from.unwrap_or(APP_EPOCH), self.to.unwrap_or(today))
    }
}

/// The date range a report covers, echoed back in every response.
#[derive(Debug, Serialize)]
pub struct Period {
    /// The first date the report covers.
    pub from: Date,
    /// The last date the report covers.
    pub to: Date,
}

/// The response to the overview report.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    /// The date range the report covers.
    pub period: Period,
    /// Totals for the period.
    pub overview: Overview,
    /// The period broken down by category.
    pub category_breakdown: Vec<CategoryBreakdown>,
}

/// A route handler for the period overview report.
pub async fn get_overview<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Query(params): Query<RangeParams>,
) -> Result<Json<OverviewResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();
    let (from, to) = params.resolve();

    let overview = analytics::overview(&state.transaction_store, user_id, from, to)?;
    let category_breakdown = analytics::category_breakdown(
        &state.category_store,
        &state.transaction_store,
        user_id,
        from,
        to,
    )?;

    Ok(Json(OverviewResponse {
        period: Period { from, to },
        overview,
        category_breakdown,
    }))
}

/// The response to the category analysis report.
#[derive(Debug, Serialize)]
pub struct CategoryAnalysisResponse {
    /// The date range the report covers.
    pub period: Period,
    /// The expense categories, largest first.
    pub expense_categories: Vec<CategoryBreakdown>,
    /// The income categories, largest first.
    pub income_categories: Vec<CategoryBreakdown>,
    /// The largest expense category, if any.
    pub top_spending_category: Option<CategoryBreakdown>,
    /// The largest income category, if any.
    pub top_income_category: Option<CategoryBreakdown>,
    /// How many categories had activity in the period.
    pub total_categories: usize,
}

/// A route handler for the category analysis report.
pub async fn get_category_analysis<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Query(params): Query<RangeParams>,
) -> Result<Json<CategoryAnalysisResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();
    let (from, to) = params.resolve();

    let breakdown = analytics::category_breakdown(
        &state.category_store,
        &state.transaction_store,
        user_id,
        from,
        to,
    )?;

    let total_categories = breakdown.len();
    let (expense_categories, income_categories): (Vec<_>, Vec<_>) = breakdown
        .into_iter()
        .partition(|row| row.kind == TransactionKind::Expense);

    Ok(Json(CategoryAnalysisResponse {
        period: Period { from, to },
        top_spending_category: expense_categories.first().cloned(),
        top_income_category: income_categories.first().cloned(),
        expense_categories,
        income_categories,
        total_categories,
    }))
}

/// The query parameters for the trends report.
#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    /// The bucket width. Defaults to monthly.
    pub period: Option<TrendPeriod>,
    /// How many buckets to look back. Defaults to 6.
    pub window: Option<u32>,
}

/// The response to the trends report.
#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    /// The bucket width used.
    pub period: TrendPeriod,
    /// How many buckets the report looked back.
    pub window: u32,
    /// One point per non-empty bucket, oldest first.
    pub trends: Vec<TrendPoint>,
}

/// A route handler for the spending trends report.
pub async fn get_trends<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendsResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let period = params.period.unwrap_or_default();
    let window = params.window.unwrap_or(DEFAULT_TREND_WINDOW);
    let today = OffsetDateTime::now_utc().date();

    let trends = analytics::spending_trends(
        &state.transaction_store,
        claims.user_id(),
        period,
        window,
        today,
    )?;

    Ok(Json(TrendsResponse {
        period,
        window,
        trends,
    }))
}

/// The key metrics block of the insights report.
#[derive(Debug, Serialize)]
pub struct KeyMetrics {
    /// Name of the largest expense category, or `"No expenses"`.
    pub highest_spending_category: String,
    /// Total expenses divided by a fixed 30-day period.
    pub average_daily_spending: f64,
    /// Letter grade derived from the savings rate.
    pub financial_health: HealthScore,
}

/// The response to the insights report.
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    /// The date range the report covers.
    pub period: Period,
    /// Totals for the period.
    pub overview: Overview,
    /// The insights whose rules fired.
    pub insights: Vec<Insight>,
    /// Derived headline numbers.
    pub key_metrics: KeyMetrics,
}

/// A route handler for the financial insights report.
pub async fn get_insights<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Query(params): Query<RangeParams>,
) -> Result<Json<InsightsResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();
    let (from, to) = params.resolve();

    let overview = analytics::overview(&state.transaction_store, user_id, from, to)?;
    let InsightsReport {
        insights,
        highest_spending_category,
        average_daily_spending,
        financial_health,
    } = analytics::financial_insights(
        &state.category_store,
        &state.transaction_store,
        user_id,
        from,
        to,
    )?;

    Ok(Json(InsightsResponse {
        period: Period { from, to },
        overview,
        insights,
        key_metrics: KeyMetrics {
            highest_spending_category,
            average_daily_spending,
            financial_health,
        },
    }))
}

/// The response to the health score report.
#[derive(Debug, Serialize)]
pub struct HealthScoreResponse {
    /// The date range the report covers.
    pub period: Period,
    /// Letter grade derived from the savings rate.
    pub health_score: HealthScore,
    /// The savings rate the grade was derived from.
    pub savings_rate: f64,
    /// Suggested next steps for the grade.
    pub recommendations: Vec<&'static str>,
    /// Totals for the period.
    pub overview: Overview,
}

/// A route handler for the financial health score report.
pub async fn get_health_score<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Query(params): Query<RangeParams>,
) -> Result<Json<HealthScoreResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();
    let (from, to) = params.resolve();

    let overview = analytics::overview(&state.transaction_store, user_id, from, to)?;
    let health_score = HealthScore::from_savings_rate(overview.savings_rate);

    let recommendations = if overview.savings_rate < 20.0 {
        vec![
            "Consider tracking your daily expenses more closely",
            "Look for areas where you can reduce discretionary spending",
            "Set up automatic transfers to a savings account",
        ]
    } else {
        vec![
            "Great job maintaining healthy savings!",
            "Consider investing your surplus savings",
            "Review your financial goals and adjust if needed",
        ]
    };

    Ok(Json(HealthScoreResponse {
        period: Period { from, to },
        health_score,
        savings_rate: overview.savings_rate,
        recommendations,
        overview,
    }))
}
