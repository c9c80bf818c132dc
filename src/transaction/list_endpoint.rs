use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Claims,
    transaction::{Transaction, TransactionQuery, get_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the caller's transactions as JSON.
///
/// Accepts the optional query parameters `type`, `category` and `sort=oldest`.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    claims: Claims,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(claims.id, &query, &connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))
        .map(Json)
}
