//! Moneylens is a personal finance tracking API.
//!
//! Users register and sign in with JWT bearer tokens, record income and
//! expense transactions tagged with categories, and retrieve aggregated
//! reports: period overviews, category breakdowns, spending trends, and
//! heuristic financial insights.
//!
//! This library provides the REST API as an [axum](https://docs.rs/axum)
//! router; see [build_router] and the `server` binary.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

pub mod analytics;
mod auth;
pub mod db;
mod endpoints;
mod logging;
pub mod models;
mod routes;
mod routing;
mod state;
pub mod stores;

pub use auth::AuthKeys;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email/password combination that does not match a
    /// registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The bearer token is missing, malformed, expired, or has a bad
    /// signature.
    #[error("invalid bearer token")]
    InvalidToken,

    /// A JWT could not be created for a signed-in user.
    ///
    /// The underlying error should only be logged on the server; clients see
    /// a generic internal error.
    #[error("could not create an auth token")]
    TokenCreation,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used as a display name.
    #[error("name cannot be empty")]
    EmptyName,

    /// The email address used to register is already taken.
    #[error("a user with this email address already exists")]
    DuplicateEmail,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A category with the same (case-insensitive) name is already visible to
    /// the user, either as a global default or one of their own.
    #[error("a category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID or name used for a transaction does not refer to a
    /// category visible to the user.
    #[error("the category does not refer to a category visible to this user")]
    InvalidCategory,

    /// The category still has transactions referencing it and cannot be
    /// deleted.
    #[error("the category is used by {0} transaction(s) and cannot be deleted")]
    CategoryInUse(i64),

    /// A zero, negative, or non-finite amount was used to create a
    /// transaction.
    #[error("transaction amounts must be greater than zero")]
    InvalidAmount,

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore
    /// future dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A reporting range was requested with a start date after its end date.
    /// The range is reported back to the caller, not repaired.
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange {
        /// The start of the requested range.
        from: Date,
        /// The end of the requested range.
        to: Date,
    },

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidCategory
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Error::InvalidCredentials | Error::InvalidToken => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::TooWeak(_)
            | Error::EmptyName
            | Error::DuplicateEmail
            | Error::EmptyCategoryName
            | Error::DuplicateCategoryName(_)
            | Error::InvalidCategory
            | Error::CategoryInUse(_)
            | Error::InvalidAmount
            | Error::FutureDate(_)
            | Error::InvalidDateRange { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            // Anything else is not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
