//! Log-in for API clients (returns a token) and for the browser (sets the session cookie).

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        JwtKeys, PublicUser, User, cookie::set_token_cookie, encode_token, get_user_by_email,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, email_input, log_in_register, password_input},
};

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The keys for signing the session token.
    pub jwt_keys: JwtKeys,
    /// How long an issued token, and the cookie holding it, stays valid.
    pub token_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The email and password entered at log-in.
///
/// Missing fields deserialize as empty strings so they fail the credential
/// check like any other wrong input.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    #[serde(default)]
    pub email: String,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
}

/// The body returned after a successful log-in or registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// A bearer token for the API.
    pub token: String,
    /// The user the token was issued to.
    pub user: PublicUser,
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid email or password";

/// Check `raw_email` and `raw_password` against the stored user.
///
/// Emails are compared after trimming and lowercasing.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email is malformed, no user has that email or the
/// password does not match. Other errors come from the database or bcrypt.
pub(crate) fn authenticate(
    raw_email: &str,
    raw_password: &str,
    connection: &Connection,
) -> Result<User, Error> {
    let email: EmailAddress = raw_email
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| Error::InvalidCredentials)?;

    let user = match get_user_by_email(&email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(raw_password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if is_password_valid {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

/// Handler for API log-in requests.
///
/// # Errors
///
/// Responds with 400 and "Invalid email or password" if the credentials do not match a user.
pub async fn log_in_api(
    State(state): State<LoginState>,
    Json(credentials): Json<LogInData>,
) -> Result<Json<AuthResponse>, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        authenticate(&credentials.email, &credentials.password, &connection)?
    };

    let token = encode_token(&user, state.token_duration, &state.jwt_keys)?;
    tracing::info!("User {} logged in via the API", user.id);

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, None))
            (password_input("", 0, error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

fn log_in_page(email: &str, error_message: Option<&str>) -> Markup {
    let log_in_form = log_in_form(email, error_message);
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content)
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    log_in_page("", None).into_response()
}

/// Handler for log-in requests from the HTML form.
///
/// On a successful log-in the session cookie is set and the client is redirected to the
/// dashboard. Otherwise the form is shown again with an error message.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_page_response();
            }
        };

        authenticate(&user_data.email, &user_data.password, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            return log_in_page(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_page(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };

    match encode_token(&user, state.token_duration, &state.jwt_keys) {
        Ok(token) => (
            set_token_cookie(jar, token, state.token_duration),
            Redirect::to(endpoints::DASHBOARD_VIEW),
        )
            .into_response(),
        Err(error) => error.into_page_response(),
    }
}

#[cfg(test)]
mod log_in_api_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState, PasswordHash, ValidatedPassword,
        auth::{AuthResponse, create_user, token::decode_token},
        endpoints,
        test_utils::get_test_state,
    };

    use super::log_in_api;

    const PASSWORD: &str = "averystrongandsecurepassword";

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(log_in_api))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn create_test_user(state: &AppState) {
        let password_hash =
            PasswordHash::new(ValidatedPassword::new(PASSWORD, &[]).unwrap(), 4).unwrap();
        create_user(
            "Alice",
            "alice@example.com".parse().unwrap(),
            password_hash,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");
    }

    #[tokio::test]
    async fn log_in_returns_token_and_user() {
        let state = get_test_state();
        create_test_user(&state);
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "alice@example.com", "password": PASSWORD}))
            .await;

        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert_eq!(body.user.name, "Alice");
        assert_eq!(body.user.email, "alice@example.com");
        let claims = decode_token(&body.token, &state.jwt_keys).unwrap();
        assert_eq!(claims.id, body.user.id);
    }

    #[tokio::test]
    async fn log_in_ignores_email_case() {
        let state = get_test_state();
        create_test_user(&state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": " Alice@Example.com ", "password": PASSWORD}))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state();
        create_test_user(&state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "alice@example.com", "password": "wrongpassword"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid email or password"}));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "bob@example.com", "password": PASSWORD}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid email or password"}));
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_fields() {
        let server = get_test_server(get_test_state());

        let response = server.post(endpoints::LOG_IN_API).json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid email or password"}));
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use scraper::Selector;

    use crate::{
        AppState, PasswordHash, ValidatedPassword,
        auth::{cookie::COOKIE_TOKEN, create_user},
        endpoints,
        test_utils::{
            assert_form_action, assert_form_error_message, assert_form_input,
            assert_form_submit_button, assert_valid_html, get_test_state, must_get_form,
            parse_html_document,
        },
    };

    use super::{INVALID_CREDENTIALS_ERROR_MSG, get_log_in_page, post_log_in};

    const PASSWORD: &str = "averystrongandsecurepassword";

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, get(get_log_in_page).post(post_log_in))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let server = get_test_server(get_test_state());

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
        let document = parse_html_document(&response);
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_action(&form, "post", endpoints::LOG_IN_VIEW);
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button(&form);

        let links = form
            .select(&Selector::parse("a[href]").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(links[0].value().attr("href"), Some(endpoints::REGISTER_VIEW));
    }

    #[tokio::test]
    async fn log_in_sets_cookie_and_redirects_to_dashboard() {
        let state = get_test_state();
        let password_hash =
            PasswordHash::new(ValidatedPassword::new(PASSWORD, &[]).unwrap(), 4).unwrap();
        create_user(
            "Alice",
            "alice@example.com".parse().unwrap(),
            password_hash,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN_VIEW)
            .form(&[("email", "alice@example.com"), ("password", PASSWORD)])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
        let cookie = response.cookie(COOKIE_TOKEN);
        assert!(!cookie.value().is_empty());
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_shows_error() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::LOG_IN_VIEW)
            .form(&[("email", "alice@example.com"), ("password", "wrong")])
            .await;

        response.assert_status(StatusCode::OK);
        let document = parse_html_document(&response);
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
        let email = form
            .select(&Selector::parse("input[name=email]").unwrap())
            .next()
            .unwrap();
        assert_eq!(email.value().attr("value"), Some("alice@example.com"));
    }
}
