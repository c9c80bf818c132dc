//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    middleware,
    response::Response,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{
        auth_guard, get_current_user, get_log_in_page, get_log_out, get_register_page,
        log_in_api, post_log_in, post_register, register_api,
    },
    dashboard::{
        get_dashboard_page, get_dashboard_summary, post_dashboard_delete_transaction,
        post_dashboard_transaction,
    },
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// The JSON API authenticates each request with a bearer token. The HTML
/// dashboard routes require the session cookie and redirect to the log-in
/// page without it.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::REGISTER_VIEW,
            get(get_register_page).post(post_register),
        )
        .route(endpoints::LOG_OUT, get(get_log_out));

    let api_routes = Router::new()
        .route(endpoints::REGISTER_API, post(register_api))
        .route(endpoints::LOG_IN_API, post(log_in_api))
        .route(endpoints::ME_API, get(get_current_user))
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_API,
            delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD_API, get(get_dashboard_summary));

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::DASHBOARD_TRANSACTIONS,
            post(post_dashboard_transaction),
        )
        .route(
            endpoints::DASHBOARD_DELETE_TRANSACTION,
            post(post_dashboard_delete_transaction),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .merge(api_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Reports that the server is up.
async fn get_root() -> Json<Value> {
    Json(json!({"message": "Backend Works! Finance API ready at /api/transactions"}))
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_page_response()
}
