/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: 全リクエストで共有する Authenticator (内部の HTTP client は connection pool を持つ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::oauth::Authenticator;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(auth: Arc<Authenticator>) -> Self {
        Self { auth }
    }
}
