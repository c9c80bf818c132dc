use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{Claims, UserID},
    timezone::local_now,
    transaction::{Transaction, TransactionType, create_transaction, parse_date},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
///
/// `type`, `amount` and `category` are required. A missing or blank `date`
/// defaults to today.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NewTransactionData {
    /// "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// The amount of money.
    pub amount: Option<f64>,
    /// The category label.
    pub category: Option<String>,
    /// Optional free text.
    pub description: Option<String>,
    /// Optional date, see [crate::transaction::parse_date] for the accepted formats.
    pub date: Option<String>,
}

const MISSING_FIELDS_MESSAGE: &str = "type, amount, category required";

impl NewTransactionData {
    /// Validate the submitted fields and insert the transaction for `user_id`.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] if a required field is missing or blank
    /// [Error::InvalidTransactionType] for a type other than income or expense
    /// and [Error::InvalidDate] for a date in an unknown format.
    pub(crate) fn insert(
        self,
        user_id: UserID,
        local_timezone: &str,
        connection: &Connection,
    ) -> Result<Transaction, Error> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        let (Some(raw_type), Some(amount), Some(category)) = (
            non_empty(self.transaction_type),
            self.amount,
            non_empty(self.category),
        ) else {
            return Err(Error::MissingFields(MISSING_FIELDS_MESSAGE));
        };

        let transaction_type = TransactionType::parse_new(raw_type.trim())?;

        let date = match non_empty(self.date) {
            Some(raw_date) => parse_date(&raw_date).ok_or(Error::InvalidDate(raw_date))?,
            None => local_now(local_timezone)
                .inspect_err(|_| tracing::error!("Invalid timezone {local_timezone}"))?
                .date(),
        };

        let builder = Transaction::build(transaction_type, amount, category.trim())
            .description(self.description.as_deref().unwrap_or_default())
            .date(date);

        create_transaction(user_id, builder, connection)
    }
}

/// A route handler for creating a new transaction, responds with the created transaction as JSON.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    claims: Claims,
    Json(data): Json<NewTransactionData>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    data.insert(claims.id, &state.local_timezone, &connection)
        .inspect_err(|error| tracing::debug!("could not create transaction: {error}"))
        .map(Json)
}
