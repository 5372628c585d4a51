/*
 * Responsibility
 * - introspection サービスが返す access token の型
 * - JSON の形 (access_token/user_id/client_id/expires) は厳密に受ける
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verified token record. Lives for one authentication decision only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(rename = "access_token")]
    pub id: String,
    pub user_id: i64,
    pub client_id: i64,
    /// Expiry as epoch seconds.
    pub expires: i64,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now.timestamp()
    }
}
