use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::oauth::Identity;

/// Handler で Identity を受け取るための extractor
/// middleware が Identity を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（anonymous / public / middleware 未設定）
///
/// X-Caller-Id header は読まない: public request では client の値が残っているため。
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Identity);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(CallerIdentity)
            .ok_or(AppError::Unauthorized)
    }
}
