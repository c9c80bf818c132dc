//! The JSON summary of a user's finances.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    aggregation::{
        CategoryBreakdown, CurrentMonthSnapshot, MonthlyBucket, Totals, Trend,
        compute_category_breakdown, compute_current_month_snapshot, compute_monthly_series,
        compute_totals, compute_trend,
    },
    auth::{Claims, UserID},
    dashboard::{handlers::DashboardState, insights::Insights},
    timezone::local_now,
    transaction::{Transaction, get_all_transactions},
};

/// Everything the dashboard shows, computed from one list of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Income, expenses and balance over all transactions.
    pub totals: Totals,
    /// Income and expenses per calendar month, oldest first.
    pub monthly: Vec<MonthlyBucket>,
    /// Income and expenses per category and the top expense category.
    pub categories: CategoryBreakdown,
    /// The figures for the month containing `now`.
    pub current_month: CurrentMonthSnapshot,
    /// The change in expenses over the last two months, if there are two months of data.
    pub trend: Option<Trend>,
    /// The figures above described in words.
    pub insights: Insights,
}

impl DashboardSummary {
    /// Run every aggregation over `transactions`.
    pub fn new(transactions: &[Transaction], now: OffsetDateTime) -> Self {
        let monthly = compute_monthly_series(transactions);
        let categories = compute_category_breakdown(transactions);
        let trend = compute_trend(&monthly);
        let insights = Insights::new(&categories, &monthly, trend.as_ref());

        Self {
            totals: compute_totals(transactions),
            current_month: compute_current_month_snapshot(transactions, now),
            monthly,
            categories,
            trend,
            insights,
        }
    }
}

/// Load the transactions of `user_id` and summarise them as of `now`.
pub(super) fn load_summary(
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(Vec<Transaction>, DashboardSummary), Error> {
    let transactions = get_all_transactions(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let summary = DashboardSummary::new(&transactions, now);

    Ok((transactions, summary))
}

/// A route handler that responds with the caller's [DashboardSummary] as JSON.
pub async fn get_dashboard_summary(
    State(state): State<DashboardState>,
    claims: Claims,
) -> Result<Json<DashboardSummary>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let now = local_now(&state.local_timezone)
        .inspect_err(|_| tracing::error!("Invalid timezone {}", state.local_timezone))?;
    let (_, summary) = load_summary(claims.id, now, &connection)?;

    Ok(Json(summary))
}
