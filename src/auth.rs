// src/auth.rs
//! HTTP basic auth for the chat-log endpoints.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config::LogAuth;

const REALM: &str = "Basic realm=\"chat logs\"";

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredentials => "Missing basic auth credentials",
            AuthError::InvalidCredentials => "Invalid credentials",
        };
        let mut resp = (StatusCode::UNAUTHORIZED, message).into_response();
        resp.headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
        resp
    }
}

/// Byte-wise comparison that does not stop at the first difference.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let mut result = a.len() ^ b.len();
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= usize::from(x ^ y);
    }
    result == 0
}

/// `(user, pass)` from an `Authorization: Basic ...` header.
pub fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

pub fn check(headers: &HeaderMap, expected: &LogAuth) -> Result<(), AuthError> {
    let (user, pass) = parse_basic(headers).ok_or(AuthError::MissingCredentials)?;
    // evaluate both to keep timing independent of which half is wrong
    let user_ok = constant_time_compare(&user, &expected.user);
    let pass_ok = constant_time_compare(&pass, &expected.pass);
    if user_ok && pass_ok {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Middleware for `from_fn_with_state`.
pub async fn basic_auth_middleware(
    State(expected): State<Arc<LogAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = check(request.headers(), &expected) {
        tracing::warn!(target: "auth", path = %request.uri().path(), "rejected log endpoint request");
        return e.into_response();
    }
    next.run(request).await
}
