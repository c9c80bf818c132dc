//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard page
//! - The form handlers for adding and deleting transactions from the page
//! - The state shared by the dashboard handlers

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    aggregation::ListQuery,
    auth::{CurrentUser, User},
    dashboard::{
        cards::{insight_cards_view, totals_cards_view},
        charts::{DashboardChart, ECHARTS_URL, charts_script, charts_view, dashboard_charts},
        forms::{filter_form, new_transaction_form},
        summary::{DashboardSummary, load_summary},
        tables::transactions_table,
    },
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, link},
    timezone::local_now,
    transaction::{NewTransactionData, Transaction, TransactionId, delete_transaction},
};

/// The state needed for the dashboard page and its forms.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData<'a> {
    user: &'a User,
    today: Date,
    summary: DashboardSummary,
    query: &'a ListQuery,
    categories: Vec<String>,
    transactions: Vec<&'a Transaction>,
    charts: [DashboardChart; 2],
}

/// Display a page with an overview of the user's finances.
///
/// The transaction list is filtered and sorted by the `type`, `category` and
/// `sort` query parameters. The cards and charts always cover every transaction.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_page_response();
        }
    };

    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => {
            tracing::error!("Invalid timezone {}", state.local_timezone);
            return error.into_page_response();
        }
    };

    let (transactions, summary) = match load_summary(user.id, now, &connection) {
        Ok(loaded) => loaded,
        Err(error) => return error.into_page_response(),
    };

    let charts = dashboard_charts(&summary.monthly, &summary.categories);
    let data = DashboardData {
        user: &user,
        today: now.date(),
        summary,
        query: &query,
        categories: distinct_categories(&transactions),
        transactions: query.apply(&transactions),
        charts,
    };

    dashboard_view(&data).into_response()
}

/// Create a transaction from the dashboard form and go back to the dashboard.
pub async fn post_dashboard_transaction(
    State(state): State<DashboardState>,
    CurrentUser(user): CurrentUser,
    Form(data): Form<NewTransactionData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_page_response();
        }
    };

    match data.insert(user.id, &state.local_timezone, &connection) {
        Ok(transaction) => {
            tracing::debug!("user {} created transaction {}", user.id, transaction.id);
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        Err(error) => {
            tracing::debug!("could not create transaction: {error}");
            error.into_page_response()
        }
    }
}

/// Delete one of the user's transactions and go back to the dashboard.
pub async fn post_dashboard_delete_transaction(
    State(state): State<DashboardState>,
    CurrentUser(user): CurrentUser,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_page_response();
        }
    };

    match delete_transaction(transaction_id, user.id, &connection) {
        Ok(()) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// The categories used by `transactions`, sorted and without duplicates.
fn distinct_categories(transactions: &[Transaction]) -> Vec<String> {
    transactions
        .iter()
        .filter_map(|transaction| transaction.category.clone())
        .filter(|category| !category.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Renders the main dashboard page with cards, forms, the transaction list and charts.
fn dashboard_view(data: &DashboardData) -> Markup {
    let log_out_link = link(endpoints::LOG_OUT, "Log out");

    let content = html!(
        div
            id="dashboard-content"
            class=(PAGE_CONTAINER_STYLE)
        {
            header class="w-full flex justify-between items-baseline my-4"
            {
                h1 class="text-2xl font-bold" { "Welcome, " (data.user.name) }
                (log_out_link)
            }

            (totals_cards_view(&data.summary.totals))
            (insight_cards_view(&data.summary.current_month, &data.summary.insights))

            section class="w-full mx-auto mb-4"
            {
                h2 class="text-xl font-semibold mb-4" { "Add Transaction" }
                (new_transaction_form(data.today))
            }

            section class="w-full mx-auto mb-4"
            {
                h2 class="text-xl font-semibold mb-4" { "Transactions" }
                (filter_form(data.query, &data.categories))
                (transactions_table(&data.transactions))
            }

            (charts_view(&data.charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}
