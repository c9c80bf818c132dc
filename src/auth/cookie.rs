//! Keeps the session token in an encrypted cookie for the HTML pages.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::auth::{
    Claims, JwtKeys,
    token::{AuthError, decode_token},
};

pub(crate) const COOKIE_TOKEN: &str = "token";

/// Store `token` in the cookie jar, expiring after `duration`.
pub(crate) fn set_token_cookie(
    jar: PrivateCookieJar,
    token: String,
    duration: Duration,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, token))
            .expires(OffsetDateTime::now_utc() + duration)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Set the token cookie to an invalid value and set its max age to zero, which should delete
/// the cookie on the client side.
pub(crate) fn invalidate_token_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Verify the token stored in `jar`.
pub(crate) fn get_claims_from_cookies(
    jar: &PrivateCookieJar,
    keys: &JwtKeys,
) -> Result<Claims, AuthError> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(AuthError::MissingToken)?;

    decode_token(cookie.value_trimmed(), keys)
}
