//! Creating accounts through the API and the registration page.

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
        AuthResponse, JwtKeys, PasswordHash, PublicUser, User, ValidatedPassword,
        cookie::set_token_cookie, create_user, encode_token,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input,
        log_in_register, password_input,
    },
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 12;

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The keys for signing the new user's token.
    pub jwt_keys: JwtKeys,
    /// How long an issued token, and the cookie holding it, stays valid.
    pub token_duration: Duration,
    /// The bcrypt cost used to hash new passwords.
    pub hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            hash_cost: state.hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The details sent to the registration API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterData {
    /// The display name for the new user.
    pub name: Option<String>,
    /// The email address used to log in.
    pub email: Option<String>,
    /// The plain text password, checked for strength before hashing.
    pub password: Option<String>,
}

/// Validate the registration details, hash the password and store the new user.
///
/// The email is trimmed and lowercased before it is stored.
///
/// # Errors
///
/// - [Error::MissingFields] if the name, email or password is empty.
/// - [Error::InvalidEmail] if the email is not a valid address.
/// - [Error::TooWeak] if the password is too easy to guess.
/// - [Error::DuplicateEmail] if another user already has the email.
pub(crate) fn register(
    name: &str,
    raw_email: &str,
    raw_password: &str,
    hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let name = name.trim();
    let raw_email = raw_email.trim().to_lowercase();

    if name.is_empty() || raw_email.is_empty() || raw_password.is_empty() {
        return Err(Error::MissingFields("All fields required"));
    }

    let email: EmailAddress = raw_email
        .parse()
        .map_err(|_| Error::InvalidEmail(raw_email.clone()))?;

    let password = ValidatedPassword::new(raw_password, &[name, &raw_email])?;
    let password_hash = PasswordHash::new(password, hash_cost)?;

    create_user(name, email, password_hash, connection)
}

/// Handler for API registration requests.
///
/// Responds with a token for the new user, so clients do not need to log in afterwards.
pub async fn register_api(
    State(state): State<RegistrationState>,
    Json(data): Json<RegisterData>,
) -> Result<Json<AuthResponse>, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        register(
            data.name.as_deref().unwrap_or_default(),
            data.email.as_deref().unwrap_or_default(),
            data.password.as_deref().unwrap_or_default(),
            state.hash_cost,
            &connection,
        )?
    };

    let token = encode_token(&user, state.token_duration, &state.jwt_keys)?;
    tracing::info!("Registered user {}", user.id);

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

/// The values to show in the registration form, and where to show an error.
#[derive(Default)]
struct RegistrationFormView<'a> {
    name: &'a str,
    email: &'a str,
    name_error: Option<&'a str>,
    email_error: Option<&'a str>,
    password_error: Option<&'a str>,
    confirm_password_error: Option<&'a str>,
}

fn registration_form(view: RegistrationFormView) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::REGISTER_VIEW)
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="Jane Doe"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(view.name);

                @if let Some(error_message) = view.name_error
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            (email_input(view.email, view.email_error))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, view.password_error))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, view.confirm_password_error))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

fn registration_page(view: RegistrationFormView) -> Markup {
    let registration_form = registration_form(view);
    let content = log_in_register("Create Account", &registration_form);
    base("Register", &[], &content)
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    registration_page(RegistrationFormView::default()).into_response()
}

/// The data submitted by the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The display name for the new user.
    pub name: String,
    /// The email address used to log in.
    pub email: String,
    /// The new password.
    pub password: String,
    /// The new password again, to catch typos.
    pub confirm_password: String,
}

/// Handler for the registration form.
///
/// On success the new user is logged in and redirected to the dashboard,
/// otherwise the form is shown again with the problem next to the relevant field.
pub async fn post_register(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let view = RegistrationFormView {
        name: &user_data.name,
        email: &user_data.email,
        ..Default::default()
    };

    if user_data.password != user_data.confirm_password {
        return registration_page(RegistrationFormView {
            confirm_password_error: Some("Passwords do not match"),
            ..view
        })
        .into_response();
    }

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_page_response();
            }
        };

        register(
            &user_data.name,
            &user_data.email,
            &user_data.password,
            state.hash_cost,
            &connection,
        )
    };

    let user = match user {
        Ok(user) => user,
        Err(error @ Error::MissingFields(_)) => {
            let message = error.to_string();
            return registration_page(RegistrationFormView {
                name_error: Some(&message),
                ..view
            })
            .into_response();
        }
        Err(error @ (Error::InvalidEmail(_) | Error::DuplicateEmail)) => {
            let message = error.to_string();
            return registration_page(RegistrationFormView {
                email_error: Some(&message),
                ..view
            })
            .into_response();
        }
        Err(error @ Error::TooWeak(_)) => {
            let message = error.to_string();
            return registration_page(RegistrationFormView {
                password_error: Some(&message),
                ..view
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return error.into_page_response();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match encode_token(&user, state.token_duration, &state.jwt_keys) {
        Ok(token) => (
            set_token_cookie(jar, token, state.token_duration),
            Redirect::to(endpoints::DASHBOARD_VIEW),
        )
            .into_response(),
        Err(error) => error.into_page_response(),
    }
}
