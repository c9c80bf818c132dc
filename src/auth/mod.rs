//! Users, passwords, tokens and the two ways of presenting them: bearer tokens for the API and
//! an encrypted session cookie for the HTML pages.

pub(crate) mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod session;
mod token;
mod user;

pub use log_in::{AuthResponse, get_log_in_page, log_in_api, post_log_in};
pub use log_out::get_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, post_register, register_api};
pub use session::{CurrentUser, get_current_user};
pub use token::{AuthError, Claims, JwtKeys, TOKEN_DURATION, encode_token};
pub use user::{
    PublicUser, Role, User, UserID, create_user, create_user_table, get_user_by_email,
    get_user_by_id,
};
