//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}',
//! use [format_endpoint].

/// The route for registering a new user.
pub const SIGN_UP: &str = "/api/auth/signup";
/// The route for signing in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route for the period overview report.
pub const ANALYTICS_OVERVIEW: &str = "/api/analytics/overview";
/// The route for the category analysis report.
pub const ANALYTICS_CATEGORIES: &str = "/api/analytics/categories";
/// The route for the spending trends report.
pub const ANALYTICS_TRENDS: &str = "/api/analytics/trends";
/// The route for the financial insights report.
pub const ANALYTICS_INSIGHTS: &str = "/api/analytics/insights";
/// The route for the financial health score report.
pub const ANALYTICS_HEALTH_SCORE: &str = "/api/analytics/health-score";
/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. This
/// function assumes that an endpoint path only contains ASCII characters and
/// a single parameter; if no parameter is found, the original path is
/// returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
