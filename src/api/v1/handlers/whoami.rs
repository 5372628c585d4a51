/*
 * Responsibility
 * - GET /whoami: middleware が確定した identity を返す (anonymous なら authenticated=false)
 * - GET /me: identity 必須 (なければ 401)
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::CallerIdentity;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub authenticated: bool,
    pub caller_id: Option<i64>,
    pub client_id: Option<i64>,
}

pub async fn whoami(identity: Result<CallerIdentity, AppError>) -> Json<WhoAmIResponse> {
    let identity = identity.ok().map(|CallerIdentity(identity)| identity);

    Json(WhoAmIResponse {
        authenticated: identity.is_some(),
        caller_id: identity.map(|i| i.caller_id),
        client_id: identity.map(|i| i.client_id),
    })
}

pub async fn me(CallerIdentity(identity): CallerIdentity) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        authenticated: true,
        caller_id: Some(identity.caller_id),
        client_id: Some(identity.client_id),
    })
}
