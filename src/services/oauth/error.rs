/*
 * Responsibility
 * - 認証処理の結果として返すエラー (AuthError) の定義
 * - introspection サービスのエラー body と同じ JSON 形を持つ
 * - IntoResponse 実装 (status はエラー自身が持つ値、4xx/5xx 以外なら 500)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where an `AuthError` came from, as far as callers need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Empty token id. No remote call was made.
    Precondition,
    /// The introspection service does not know the token.
    NotFound,
    /// An unknown token was turned into a rejection by policy.
    Unauthorized,
    /// The introspection service reported its own failure.
    RemoteServer,
    /// The remote response did not have the expected shape.
    InternalParse,
    /// No usable response (connect error, timeout).
    Transport,
}

/// Error returned by the token resolver and the authenticator.
///
/// Remote error bodies deserialize straight into this type and are
/// forwarded as-is. Locally built errors remember their kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{error}: {message}")]
pub struct AuthError {
    pub message: String,
    pub status: u16,
    pub error: String,
    #[serde(default)]
    pub causes: Option<Vec<serde_json::Value>>,
    #[serde(skip)]
    local_kind: Option<AuthErrorKind>,
}

impl AuthError {
    fn local(kind: AuthErrorKind, status: StatusCode, error: &str, message: String) -> Self {
        Self {
            message,
            status: status.as_u16(),
            error: error.to_string(),
            causes: None,
            local_kind: Some(kind),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::local(
            AuthErrorKind::InternalParse,
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            message.into(),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::local(
            AuthErrorKind::NotFound,
            StatusCode::NOT_FOUND,
            "not_found",
            message.into(),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::local(
            AuthErrorKind::Unauthorized,
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            message.into(),
        )
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::local(
            AuthErrorKind::Precondition,
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            message.into(),
        )
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::local(
            AuthErrorKind::Transport,
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            message.into(),
        )
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self.local_kind {
            Some(kind) => kind,
            None if self.status == StatusCode::NOT_FOUND.as_u16() => AuthErrorKind::NotFound,
            None => AuthErrorKind::RemoteServer,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == AuthErrorKind::NotFound
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // A rejection must never look like success; only 4xx/5xx are forwarded.
        let status = StatusCode::from_u16(self.status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}
