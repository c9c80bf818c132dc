//! Resolves the signed-in user for a request.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{AuthError, Claims, JwtKeys, PublicUser, User, get_user_by_id},
};

/// The state needed to look up the signed-in user.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The keys for verifying bearer tokens.
    pub jwt_keys: JwtKeys,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<SessionState> for JwtKeys {
    fn from_ref(state: &SessionState) -> Self {
        state.jwt_keys.clone()
    }
}

/// The user making the request.
///
/// The claims are taken from the request extensions when [crate::auth::auth_guard]
/// has already checked the session cookie, otherwise from the bearer token.
/// The user is loaded from the database once and cached in the request for
/// any later extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    SessionState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(current_user) = parts.extensions.get::<CurrentUser>() {
            return Ok(current_user.clone());
        }

        let state = SessionState::from_ref(state);

        let claims = match parts.extensions.get::<Claims>() {
            Some(claims) => claims.clone(),
            None => Claims::from_request_parts(parts, &state)
                .await
                .map_err(IntoResponse::into_response)?,
        };

        let user = {
            let connection = state
                .db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError.into_response())?;

            get_user_by_id(claims.id, &connection).map_err(|error| match error {
                // The token outlived the account.
                Error::NotFound => AuthError::InvalidToken.into_response(),
                error => error.into_response(),
            })?
        };

        let current_user = CurrentUser(user);
        parts.extensions.insert(current_user.clone());

        Ok(current_user)
    }
}

/// A route handler that returns the signed-in user.
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}
