/*
 * Responsibility
 * - X-Public / X-Client-Id / X-Caller-Id の読み書き
 * - request header の identity を書き換えてよいのはこのモジュールだけ
 * - 認証前に client が付けてきた identity header は信用しない (clean_request)
 */
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};

use super::token::AccessToken;

pub const HEADER_X_PUBLIC: &str = "X-Public";
pub const HEADER_X_CLIENT_ID: &str = "X-Client-Id";
pub const HEADER_X_CALLER_ID: &str = "X-Caller-Id";
pub const PARAM_ACCESS_TOKEN: &str = "access_token";

// `from_static` only accepts the lowercase form.
const X_CLIENT_ID: HeaderName = HeaderName::from_static("x-client-id");
const X_CALLER_ID: HeaderName = HeaderName::from_static("x-caller-id");

/// A missing request counts as public.
pub fn is_public<B>(req: Option<&Request<B>>) -> bool {
    match req {
        None => true,
        Some(req) => req
            .headers()
            .get(HEADER_X_PUBLIC)
            .is_some_and(|v| v.as_bytes() == b"true"),
    }
}

pub fn caller_id<B>(req: Option<&Request<B>>) -> Option<i64> {
    req.and_then(|req| read_id(req.headers(), HEADER_X_CALLER_ID))
}

pub fn client_id<B>(req: Option<&Request<B>>) -> Option<i64> {
    req.and_then(|req| read_id(req.headers(), HEADER_X_CLIENT_ID))
}

pub(crate) fn read_id(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.parse::<i64>().ok()
}

/// Drops every client-supplied identity header. Safe to call twice.
pub fn clean_request<B>(req: Option<&mut Request<B>>) {
    let Some(req) = req else {
        return;
    };

    let headers = req.headers_mut();
    headers.remove(X_CLIENT_ID);
    headers.remove(X_CALLER_ID);
}

/// Writes the verified identity. Existing values are replaced, not appended.
pub fn set_identity<B>(req: &mut Request<B>, token: &AccessToken) {
    let headers = req.headers_mut();
    headers.insert(X_CALLER_ID, HeaderValue::from(token.user_id));
    headers.insert(X_CLIENT_ID, HeaderValue::from(token.client_id));
}
