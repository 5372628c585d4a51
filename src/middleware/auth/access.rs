//! access token (introspection) 検証 → X-Caller-Id / X-Client-Id を request header に入れる
//!
//! - `X-Public: true` の request は素通し
//! - token なし / upstream で not found は anonymous として通す (policy で 401 にできる)
//! - それ以外の AuthError は、その status のまま response にする
//!
//! 認可 (誰が何をできるか) はこの middleware の責務ではない。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::services::oauth::Verdict;
use crate::state::AppState;

/// 認証を掛けたい Router に middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match state.auth.authenticate(Some(&mut req)).await {
        Ok(Verdict::Authenticated(identity)) => {
            tracing::debug!(
                caller_id = identity.caller_id,
                client_id = identity.client_id,
                "request authenticated"
            );
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(identity);
        }
        Ok(Verdict::Public | Verdict::Anonymous) => {}
        Err(err) => return err.into_response(),
    }

    next.run(req).await
}
