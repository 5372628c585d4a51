/*
 * Responsibility
 * - token id → AccessToken の解決 (introspection サービスへの GET 1 回)
 * - remote の応答を AccessToken / AuthError のどちらか 1 つに必ず落とす
 * - body の形が崩れていたら remote の status に関係なく 500 にまとめる
 */
use super::client::TokenClient;
use super::error::AuthError;
use super::token::AccessToken;

pub const MSG_EMPTY_TOKEN_ID: &str = "invalid access token id";
pub const MSG_INVALID_CLIENT_RESPONSE: &str =
    "invalid rest client response when trying to get access token";
pub const MSG_INVALID_RESPONSE_BODY: &str =
    "invalid response body when unmarshal response to token";

/// Resolve `token_id` through `client`. No retries, no caching.
pub async fn resolve_access_token<C>(client: &C, token_id: &str) -> Result<AccessToken, AuthError>
where
    C: TokenClient + ?Sized,
{
    let token_id = token_id.trim();
    if token_id.is_empty() {
        return Err(AuthError::precondition(MSG_EMPTY_TOKEN_ID));
    }

    let resp = match client.get_access_token(token_id).await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(
                error = %err,
                backend = client.backend_name(),
                "token introspection request failed"
            );
            return Err(AuthError::transport(MSG_INVALID_CLIENT_RESPONSE));
        }
    };

    if !resp.is_success() {
        return Err(match serde_json::from_slice::<AuthError>(&resp.body) {
            Ok(remote) => remote,
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    status = resp.status,
                    "unparseable error body from token introspection"
                );
                AuthError::internal_server_error(MSG_INVALID_RESPONSE_BODY)
            }
        });
    }

    serde_json::from_slice::<AccessToken>(&resp.body).map_err(|err| {
        tracing::debug!(error = %err, "unparseable token body from token introspection");
        AuthError::internal_server_error(MSG_INVALID_RESPONSE_BODY)
    })
}
