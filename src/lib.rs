//! A personal finance tracker.
//!
//! Users register, log in and record income and expense transactions. The
//! transactions are aggregated into totals, monthly and per-category
//! breakdowns, a snapshot of the current month and a month-over-month
//! spending trend. The data is served as a JSON API authenticated with bearer
//! tokens, and as an HTML dashboard with charts for browsers holding a
//! session cookie.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod aggregation;
mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod logging;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    CategoryBreakdown, CategoryBucket, CurrentMonthSnapshot, ListQuery, MonthKey, MonthlyBucket,
    SortKey, TextFilter, Totals, Trend, TrendDirection, UNKNOWN_CATEGORY,
    compute_category_breakdown, compute_current_month_snapshot, compute_monthly_series,
    compute_totals, compute_trend, sort_transactions,
};
pub use app_state::{AppState, create_cookie_key};
pub use auth::{
    PasswordHash, PublicUser, Role, User, UserID, ValidatedPassword, create_user, get_user_by_email,
};
pub use dashboard::{DashboardSummary, Insights};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Transaction, TransactionBuilder, TransactionId, TransactionType, create_transaction,
    format_date, get_all_transactions, parse_date,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
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
    /// One or more required fields were missing from a request.
    ///
    /// The message names the fields the client must send.
    #[error("{0}")]
    MissingFields(&'static str),

    /// The email address given at registration is not a valid address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// The user provided a password that is too easy to guess.
    #[error("Password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Another user has already registered with the email address.
    #[error("Email already used")]
    DuplicateEmail,

    /// The email and password do not match a registered user.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The JSON Web Token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// A new transaction had a type other than income or expense.
    #[error("Invalid transaction type \"{0}\", expected income or expense")]
    InvalidTransactionType(String),

    /// A new transaction had a date that could not be parsed.
    #[error("Invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("Not found.")]
    NotFound,

    /// Tried to delete a transaction that does not exist, or belongs to another user.
    #[error("Transaction not found.")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
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

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields(_)
            | Error::InvalidEmail(_)
            | Error::TooWeak(_)
            | Error::DuplicateEmail
            | Error::InvalidCredentials
            | Error::InvalidTransactionType(_)
            | Error::InvalidDate(_) => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as a full HTML page, for handlers that serve the browser.
    pub(crate) fn into_page_response(self) -> Response {
        let status_code = self.status_code();

        let page = match self {
            Error::NotFound | Error::DeleteMissingTransaction => html::error_view(
                "Not Found",
                "404",
                "Page not found.",
                "Check the link, or go back to the dashboard.",
            ),
            Error::InvalidTimezoneError(timezone) => html::error_view(
                "Internal Server Error",
                "500",
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            error if status_code == StatusCode::BAD_REQUEST => html::error_view(
                "Bad Request",
                "400",
                &error.to_string(),
                "Go back and check the form.",
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                html::error_view(
                    "Internal Server Error",
                    "500",
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        };

        (status_code, page).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "Server error".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::Error;

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8_lossy(&body).to_string()
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests() {
        let response = Error::MissingFields("All fields required").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            r#"{"error":"All fields required"}"#
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let response = Error::DeleteMissingTransaction.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_text(response).await,
            r#"{"error":"Transaction not found."}"#
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = Error::HashingError("bcrypt exploded".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, r#"{"error":"Server error"}"#);
    }

    #[tokio::test]
    async fn page_response_renders_html() {
        let response = Error::NotFound.into_page_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found."));
    }

    #[test]
    fn unique_email_violation_maps_to_duplicate_email() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE user (email TEXT UNIQUE)", ())
            .unwrap();
        connection
            .execute("INSERT INTO user (email) VALUES ('a@b.c')", ())
            .unwrap();

        let error: Error = connection
            .execute("INSERT INTO user (email) VALUES ('a@b.c')", ())
            .unwrap_err()
            .into();

        assert_eq!(error, Error::DuplicateEmail);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let connection = Connection::open_in_memory().unwrap();

        let error: Error = connection
            .query_row("SELECT 1 WHERE 0", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();

        assert_eq!(error, Error::NotFound);
    }
}
