//! Transactions: the model, its storage and the JSON endpoints for managing them.

mod core;
mod create_endpoint;
mod date;
mod delete_endpoint;
mod list_endpoint;

pub use core::{
    Transaction, TransactionBuilder, TransactionId, TransactionQuery, TransactionType,
    create_transaction, create_transaction_table, delete_transaction, get_all_transactions,
    get_transactions,
};
pub use create_endpoint::{NewTransactionData, create_transaction_endpoint};
pub use date::{format_date, parse_date};
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;
