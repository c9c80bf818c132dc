//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Request and response bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// The form and JSON fields that are never written to the logs.
const SECRET_FIELDS: [&str; 3] = ["password", "confirm_password", "token"];

/// Headers that carry session tokens.
const SECRET_HEADERS: [axum::http::HeaderName; 3] = [AUTHORIZATION, COOKIE, SET_COOKIE];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Password and token fields in form and JSON bodies are redacted, as are
/// the headers that carry session tokens.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    let display_text = redact_body(&parts.headers, &body_text);
    log_body(
        "Received request",
        &format!(
            "{} {} {:?}\nheaders: {:#?}",
            parts.method,
            parts.uri,
            parts.version,
            redact_headers(&parts.headers)
        ),
        &display_text,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);
    log_body(
        "Sending response",
        &format!(
            "{} {:?}\nheaders: {:#?}",
            parts.status,
            parts.version,
            redact_headers(&parts.headers)
        ),
        &redact_body(&parts.headers, &body_text),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in SECRET_HEADERS {
        if headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(REDACTED));
        }
    }

    headers
}

fn redact_body(headers: &HeaderMap, body_text: &str) -> String {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        SECRET_FIELDS
            .iter()
            .fold(body_text.to_owned(), |text, field| {
                redact_password(&text, field)
            })
    } else if content_type.starts_with("application/json") {
        redact_json(body_text)
    } else {
        body_text.to_owned()
    }
}

fn redact_password(form_text: &str, field_name: &str) -> String {
    let key = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&key) {
                format!("{key}{REDACTED}")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn redact_json(body_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_owned();
    };

    if let Value::Object(map) = &mut value {
        for field in SECRET_FIELDS {
            if let Some(secret) = map.get_mut(field) {
                *secret = Value::String(REDACTED.to_owned());
            }
        }
    }

    value.to_string()
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_body(message: &str, headers: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{message}: {headers}\nbody: {}...", truncate(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {headers}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_body, truncate};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        (logs, tracing::subscriber::set_default(subscriber))
    }

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn redacts_form_passwords() {
        let body = "email=a%40b.c&password=hunter2&confirm_password=hunter2";

        let got = redact_body(&headers("application/x-www-form-urlencoded"), body);

        assert_eq!(
            got,
            "email=a%40b.c&password=********&confirm_password=********"
        );
    }

    #[test]
    fn redacts_json_password() {
        let body = r#"{"email":"a@b.c","password":"hunter2"}"#;

        let got = redact_body(&headers("application/json"), body);

        assert!(!got.contains("hunter2"), "password leaked in {got}");
        assert!(got.contains("a@b.c"));
    }

    #[test]
    fn redacts_json_token() {
        let body = r#"{"token":"eyJhbGciOiJIUzI1NiJ9.abc.def","user":{"name":"Alice"}}"#;

        let got = redact_body(&headers("application/json"), body);

        assert!(!got.contains("eyJhbGciOiJIUzI1NiJ9"), "token leaked in {got}");
        assert!(got.contains("Alice"));
    }

    #[test]
    fn leaves_other_bodies_alone() {
        let body = "password=hunter2";

        let got = redact_body(&headers("text/plain"), body);

        assert_eq!(got, body);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let got = truncate(&body);

        assert!(got.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(got.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server.post("/echo").text("hello, world").await;

        response.assert_status_ok();
        response.assert_text("hello, world");
    }

    #[tokio::test]
    async fn does_not_log_bearer_token() {
        let (logs, _guard) = capture_logs();
        let app = Router::new()
            .route("/me", get(|| async { "ok" }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");

        server
            .get("/me")
            .authorization_bearer("SECRETJWTVALUE123")
            .await
            .assert_status_ok();

        let logs = logs.text();
        assert!(logs.contains("/me"), "request was not logged: {logs}");
        assert!(!logs.contains("SECRETJWTVALUE123"), "token leaked in {logs}");
    }

    #[tokio::test]
    async fn does_not_log_token_in_response_body() {
        let (logs, _guard) = capture_logs();
        let app = Router::new()
            .route(
                "/log_in",
                post(|| async {
                    Json(json!({"token": "SECRETJWTVALUE123", "user": {"name": "Alice"}}))
                }),
            )
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");

        server.post("/log_in").await.assert_status_ok();

        let logs = logs.text();
        assert!(logs.contains("Sending response"), "response was not logged: {logs}");
        assert!(!logs.contains("SECRETJWTVALUE123"), "token leaked in {logs}");
    }
}
