/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - access middleware は app 側で v1 全体に掛ける
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    whoami::{me, whoami},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/whoami", get(whoami))
        .route("/me", get(me))
}
