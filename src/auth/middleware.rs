//! Authentication middleware that validates the session cookie and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    auth::{JwtKeys, cookie::get_claims_from_cookies},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The keys for verifying the session token.
    pub jwt_keys: JwtKeys,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            jwt_keys: state.jwt_keys.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// The user ID is placed into the request extensions and the request executed normally if the
/// cookie holds a valid token, otherwise the client is redirected to the log-in page.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>`
/// or the [crate::auth::CurrentUser] extractor to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar: PrivateCookieJar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await
    {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
        }
    };

    let claims = match get_claims_from_cookies(&jar, &state.jwt_keys) {
        Ok(claims) => claims,
        Err(error) => {
            tracing::debug!("{error}, redirecting {} to log in page", parts.uri);
            return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
        }
    };

    parts.extensions.insert(claims.id);
    parts.extensions.insert(claims);

    next.run(Request::from_parts(parts, body)).await
}
