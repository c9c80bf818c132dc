//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{Connection, Row, ToSql};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::Date;

use crate::{Error, auth::UserID, transaction::date};

/// The database row ID of a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// Stored and matched case-sensitively as "income" or "expense".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
    /// Any other value written by another producer. Never counted in sums.
    Other(String),
}

impl TransactionType {
    /// The stored text for this type.
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Other(raw) => raw,
        }
    }

    /// Interpret a stored type string.
    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "income" => TransactionType::Income,
            "expense" => TransactionType::Expense,
            other => TransactionType::Other(other.to_owned()),
        }
    }

    /// Parse a type submitted by a client, rejecting anything other than
    /// "income" or "expense".
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] for any other value.
    pub fn parse_new(raw: &str) -> Result<Self, Error> {
        match TransactionType::from_stored(raw) {
            TransactionType::Other(other) => Err(Error::InvalidTransactionType(other)),
            valid => Ok(valid),
        }
    }
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Other(String::new())
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TransactionType::from_stored(&raw))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    /// The amount of money. The sign is not meaningful, see [TransactionType].
    pub amount: f64,
    /// A free-form label such as "food" or "salary".
    #[serde(default)]
    pub category: Option<String>,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
    /// When the transaction happened, if known.
    #[serde(
        default,
        serialize_with = "date::serialize",
        deserialize_with = "date::deserialize"
    )]
    pub date: Option<Date>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            category: category.to_owned(),
            description: String::new(),
            date: None,
        }
    }
}

/// A builder for inserting [Transaction] rows.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Income or expense.
    pub transaction_type: TransactionType,
    /// The amount as entered by the user.
    pub amount: f64,
    /// The category label.
    pub category: String,
    /// Defaults to an empty string.
    pub description: String,
    /// Rows without a date are allowed but are left out of monthly summaries.
    pub date: Option<Date>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    /// Set the date for the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }
}

/// Filters and ordering applied in SQL when listing transactions.
///
/// A filter value of "All" (any case) or an empty string means no filter.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TransactionQuery {
    /// Only include transactions with exactly this type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
    /// "oldest" lists the oldest first, anything else lists the newest first.
    pub sort: Option<String>,
}

fn active_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTransactionType] if the builder's type is not income or expense,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if let TransactionType::Other(other) = builder.transaction_type {
        return Err(Error::InvalidTransactionType(other));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, type, amount, category, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, type, amount, category, description, date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.transaction_type.as_str(),
                builder.amount,
                builder.category,
                builder.description,
                builder.date.map(date::format_date),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve the transactions owned by `user_id`, filtered and ordered by `query`.
///
/// Newest first by default, ties broken by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let raw_user_id = user_id.as_i64();
    let mut sql = String::from(
        "SELECT id, type, amount, category, description, date FROM \"transaction\" WHERE user_id = ?",
    );
    let mut params: Vec<&dyn ToSql> = vec![&raw_user_id];

    let transaction_type = active_filter(&query.transaction_type);
    if let Some(transaction_type) = &transaction_type {
        sql.push_str(" AND type = ?");
        params.push(transaction_type);
    }

    let category = active_filter(&query.category);
    if let Some(category) = &category {
        sql.push_str(" AND category = ?");
        params.push(category);
    }

    if query.sort.as_deref() == Some("oldest") {
        sql.push_str(" ORDER BY date ASC, id ASC");
    } else {
        sql.push_str(" ORDER BY date DESC, id DESC");
    }

    let mut statement = connection.prepare(&sql)?;
    let transactions = statement
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect();

    transactions
}

/// Retrieve every transaction owned by `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    get_transactions(user_id, &TransactionQuery::default(), connection)
}

/// Delete the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if no row was deleted, which includes
///   transactions owned by other users,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// A stored date that cannot be parsed maps to `None`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_type: String = row.get(1)?;
    let amount = row.get(2)?;
    let category: Option<String> = row.get(3)?;
    let description: Option<String> = row.get(4)?;
    let raw_date: Option<String> = row.get(5)?;

    Ok(Transaction {
        id,
        transaction_type: TransactionType::from_stored(&raw_type),
        amount,
        category,
        description: description.unwrap_or_default(),
        date: raw_date.as_deref().and_then(date::parse_date),
    })
}

// ============================================================================
// TESTS
// ============================================================================
