use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::Claims,
    transaction::{TransactionId, delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the caller's transactions.
///
/// Responds with 404 if the transaction does not exist or belongs to someone else.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, claims.id, &connection)?;

    Ok(Json(json!({"message": "Transaction deleted successfully"})))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::delete};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
        test_utils::{get_test_state, log_in_test_user},
        transaction::{Transaction, TransactionType, create_transaction, get_all_transactions},
    };

    use super::delete_transaction_endpoint;

    fn get_test_server() -> (TestServer, AppState) {
        let state = get_test_state();
        let app = Router::new()
            .route(endpoints::TRANSACTION_API, delete(delete_transaction_endpoint))
            .with_state(state.clone());

        (
            TestServer::new(app).expect("Could not create test server."),
            state,
        )
    }

    #[tokio::test]
    async fn delete_succeeds() {
        let (server, state) = get_test_server();
        let (user, token) = log_in_test_user(&state, "alice@example.com");
        let transaction = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 12.0, "food"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION_API, transaction.id))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"message": "Transaction deleted successfully"}));
        let remaining = get_all_transactions(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_transaction_is_not_found() {
        let (server, state) = get_test_server();
        let (_, token) = log_in_test_user(&state, "alice@example.com");

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION_API, 1337))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "Transaction not found."}));
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let (server, state) = get_test_server();
        let (alice, _) = log_in_test_user(&state, "alice@example.com");
        let (_, bob_token) = log_in_test_user(&state, "bob@example.com");
        let transaction = create_transaction(
            alice.id,
            Transaction::build(TransactionType::Income, 12.0, "salary"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION_API, transaction.id))
            .authorization_bearer(&bob_token)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let remaining =
            get_all_transactions(alice.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(remaining, vec![transaction]);
    }
}
