use rusqlite::Connection;

use crate::{
    AppState,
    auth::{PasswordHash, TOKEN_DURATION, User, create_user, encode_token},
};

/// An app backed by an in-memory database, with a bcrypt cost low enough for fast tests.
pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let mut state =
        AppState::new(connection, "foobar", "Etc/UTC").expect("Could not create app state");
    state.hash_cost = 4;

    state
}

/// Insert a user with `email` and return them with a valid bearer token.
pub(crate) fn log_in_test_user(state: &AppState, email: &str) -> (User, String) {
    let user = create_user(
        "Test User",
        email.parse().expect("Invalid test email"),
        PasswordHash::new_unchecked("hunter2"),
        &state.db_connection.lock().expect("Could not acquire database lock"),
    )
    .expect("Could not create test user");
    let token =
        encode_token(&user, TOKEN_DURATION, &state.jwt_keys).expect("Could not create token");

    (user, token)
}
