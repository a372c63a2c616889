//! Application router configuration.

use axum::{
    Json, Router, middleware,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, Error, endpoints,
    logging::logging_middleware,
    routes::{analytics, auth, categories, transactions},
    stores::{CategoryStore, TransactionStore, UserStore},
};

/// Return a router with all the app's routes.
pub fn build_router<C, T, U>(state: AppState<C, T, U>) -> Router
where
    C: CategoryStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
    U: UserStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::SIGN_UP, post(auth::sign_up::<C, T, U>))
        .route(endpoints::LOG_IN, post(auth::log_in::<C, T, U>))
        .route(
            endpoints::TRANSACTIONS,
            get(transactions::get_transactions::<C, T, U>)
                .post(transactions::create_transaction::<C, T, U>),
        )
        .route(
            endpoints::TRANSACTION,
            axum::routing::put(transactions::update_transaction::<C, T, U>)
                .delete(transactions::delete_transaction::<C, T, U>),
        )
        .route(
            endpoints::CATEGORIES,
            get(categories::get_categories::<C, T, U>)
                .post(categories::create_category::<C, T, U>),
        )
        .route(
            endpoints::CATEGORY,
            axum::routing::delete(categories::delete_category::<C, T, U>),
        )
        .route(
            endpoints::ANALYTICS_OVERVIEW,
            get(analytics::get_overview::<C, T, U>),
        )
        .route(
            endpoints::ANALYTICS_CATEGORIES,
            get(analytics::get_category_analysis::<C, T, U>),
        )
        .route(
            endpoints::ANALYTICS_TRENDS,
            get(analytics::get_trends::<C, T, U>),
        )
        .route(
            endpoints::ANALYTICS_INSIGHTS,
            get(analytics::get_insights::<C, T, U>),
        )
        .route(
            endpoints::ANALYTICS_HEALTH_SCORE,
            get(analytics::get_health_score::<C, T, U>),
        )
        .layer(middleware::from_fn(logging_middleware))
        .fallback(get_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "error": "I'm a teapot" })),
    )
        .into_response()
}

async fn get_not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
mod route_tests {
    use std::sync::{Arc, Mutex};

    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, build_router,
        db::initialize,
        endpoints::{self, format_endpoint},
        stores::sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
    };

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        let connection = Arc::new(Mutex::new(connection));
        let state = AppState::new(
            "42",
            SQLiteCategoryStore::new(connection.clone()),
            SQLiteTransactionStore::new(connection.clone()),
            SQLiteUserStore::new(connection),
        );

        TestServer::new(build_router(state))
    }

    async fn sign_up_test_user(server: &TestServer) -> String {
        let response = server
            .post(endpoints::SIGN_UP)
            .content_type("application/json")
            .json(&json!({
                "name": "Test",
                "email": "test@test.com",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);

        response.json::<Value>()["token"].as_str().unwrap().to_string()
    }

    async fn create_transaction(
        server: &TestServer,
        token: &str,
        amount: f64,
        kind: &str,
        category_name: &str,
        date: &str,
    ) {
        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .content_type("application/json")
            .json(&json!({
                "category_name": category_name,
                "amount": amount,
                "kind": kind,
                "date": date,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn sign_up_then_log_in_succeeds() {
        let server = get_test_server();
        sign_up_test_user(&server).await;

        let response = server
            .post(endpoints::LOG_IN)
            .content_type("application/json")
            .json(&json!({
                "email": "test@test.com",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["user"]["email"], "test@test.com");
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server();
        sign_up_test_user(&server).await;

        server
            .post(endpoints::LOG_IN)
            .content_type("application/json")
            .json(&json!({
                "email": "test@test.com",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn sign_up_fails_with_weak_password() {
        let server = get_test_server();

        server
            .post(endpoints::SIGN_UP)
            .content_type("application/json")
            .json(&json!({
                "name": "Test",
                "email": "test@test.com",
                "password": "hunter2",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn protected_routes_fail_without_token() {
        let server = get_test_server();

        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status_unauthorized();
        server
            .get(endpoints::ANALYTICS_OVERVIEW)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn create_and_list_transactions() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        create_transaction(&server, &token, 100.0, "income", "Salary", "2024-01-05").await;
        create_transaction(&server, &token, 40.0, "expense", "Food", "2024-01-10").await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["count"], 2);
        // Most recent first.
        assert_eq!(body["transactions"][0]["amount"], 40.0);
        assert_eq!(body["transactions"][0]["kind"], "expense");
    }

    #[tokio::test]
    async fn create_transaction_fails_with_unknown_category() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "category_name": "Yachts",
                "amount": 1000000.0,
                "kind": "expense",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_and_delete_transaction() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "category_name": "Food",
                "amount": 40.0,
                "kind": "expense",
                "date": "2024-01-10",
            }))
            .await
            .json::<Value>();

        let transaction_id = transaction["id"].as_i64().unwrap();
        let endpoint = format_endpoint(endpoints::TRANSACTION, transaction_id);

        let response = server
            .put(&endpoint)
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "amount": 45.0 }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["amount"], 45.0);

        server
            .delete(&endpoint)
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .await;
        assert_eq!(response.json::<Value>()["count"], 0);
    }

    #[tokio::test]
    async fn users_cannot_touch_each_others_transactions() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "category_name": "Food",
                "amount": 40.0,
                "kind": "expense",
                "date": "2024-01-10",
            }))
            .await
            .json::<Value>();

        let other_token = server
            .post(endpoints::SIGN_UP)
            .content_type("application/json")
            .json(&json!({
                "name": "Other",
                "email": "other@test.com",
                "password": "anotherverysecurepassword",
            }))
            .await
            .json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string();

        let endpoint = format_endpoint(
            endpoints::TRANSACTION,
            transaction["id"].as_i64().unwrap(),
        );

        server
            .delete(&endpoint)
            .authorization_bearer(&other_token)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn category_list_includes_defaults_and_custom_categories() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "name": "Board games", "kind": "expense" }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        let names: Vec<&str> = body["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|category| category["name"].as_str().unwrap())
            .collect();

        assert!(names.contains(&"Food"));
        assert!(names.contains(&"Board games"));
    }

    #[tokio::test]
    async fn create_category_fails_on_duplicate_of_default() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "name": "food", "kind": "expense" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn overview_report_sums_the_requested_period() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        create_transaction(&server, &token, 100.0, "income", "Salary", "2024-01-05").await;
        create_transaction(&server, &token, 40.0, "expense", "Food", "2024-01-10").await;

        let response = server
            .get(endpoints::ANALYTICS_OVERVIEW)
            .authorization_bearer(&token)
            .add_query_param("from", "2024-01-01")
            .add_query_param("to", "2024-01-31")
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["overview"]["total_income"], 100.0);
        assert_eq!(body["overview"]["total_expense"], 40.0);
        assert_eq!(body["overview"]["savings"], 60.0);
        assert_eq!(body["overview"]["savings_rate"], 60.0);
        assert_eq!(body["overview"]["transaction_count"], 2);
        assert_eq!(body["category_breakdown"][0]["category_name"], "Salary");
        assert_eq!(body["category_breakdown"][1]["category_name"], "Food");
        assert_eq!(body["category_breakdown"][1]["percentage"], 100.0);
    }

    #[tokio::test]
    async fn overview_report_rejects_inverted_range() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        server
            .get(endpoints::ANALYTICS_OVERVIEW)
            .authorization_bearer(&token)
            .add_query_param("from", "2024-02-01")
            .add_query_param("to", "2024-01-01")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn insights_report_without_expenses_uses_sentinels() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        create_transaction(&server, &token, 100.0, "income", "Salary", "2024-01-05").await;

        let response = server
            .get(endpoints::ANALYTICS_INSIGHTS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["key_metrics"]["highest_spending_category"], "No expenses");
        assert_eq!(body["key_metrics"]["average_daily_spending"], 0.0);
        assert_eq!(body["key_metrics"]["financial_health"], "A - Excellent");
    }

    #[tokio::test]
    async fn health_score_report_grades_the_savings_rate() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        create_transaction(&server, &token, 100.0, "income", "Salary", "2024-01-05").await;
        create_transaction(&server, &token, 40.0, "expense", "Food", "2024-01-10").await;

        let response = server
            .get(endpoints::ANALYTICS_HEALTH_SCORE)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["health_score"], "A - Excellent");
        assert_eq!(body["savings_rate"], 60.0);
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn trends_report_buckets_by_month() {
        let server = get_test_server();
        let token = sign_up_test_user(&server).await;

        // Dates relative to today so they land inside the trailing window.
        let today = time::OffsetDateTime::now_utc().date();
        let last_month = today - time::Duration::days(30);

        create_transaction(
            &server,
            &token,
            100.0,
            "income",
            "Salary",
            &last_month.to_string(),
        )
        .await;
        create_transaction(&server, &token, 40.0, "expense", "Food", &today.to_string()).await;

        let response = server
            .get(endpoints::ANALYTICS_TRENDS)
            .authorization_bearer(&token)
            .add_query_param("period", "monthly")
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["period"], "monthly");
        assert_eq!(body["window"], 6);

        let trends = body["trends"].as_array().unwrap();
        assert!(!trends.is_empty());

        // Labels are ascending and unique.
        let labels: Vec<&str> = trends
            .iter()
            .map(|point| point["period"].as_str().unwrap())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(labels, sorted);
    }

    #[tokio::test]
    async fn unknown_route_answers_not_found() {
        let server = get_test_server();

        server.get("/api/nope").await.assert_status_not_found();
    }
}
