//! Per-request authentication decision.
//!
//! Flow:
//! - no request → nothing to authenticate
//! - `X-Public: true` → skip (headers untouched, no remote call)
//! - strip client-supplied identity headers
//! - `access_token` query param → introspection (no other token source)
//! - resolved → write `X-Caller-Id` / `X-Client-Id`
//!
//! Unknown tokens pass through as anonymous unless `reject_unknown_tokens`
//! is set. Authorization decisions belong to the handlers behind this.
use std::sync::Arc;

use axum::http::Request;
use chrono::Utc;

use super::client::TokenClient;
use super::error::AuthError;
use super::headers::{self, PARAM_ACCESS_TOKEN};
use super::resolver::resolve_access_token;

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub caller_id: i64,
    pub client_id: i64,
}

/// Outcome of a successful (non-error) authentication pass.
///
/// `Public` and `Anonymous` carry no identity: the request continues but
/// nothing was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Public,
    Anonymous,
    Authenticated(Identity),
}

impl Verdict {
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Verdict::Authenticated(identity) => Some(*identity),
            Verdict::Public | Verdict::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPolicy {
    /// Turn "token not found upstream" into a 401 instead of an anonymous pass.
    pub reject_unknown_tokens: bool,
}

pub struct Authenticator {
    client: Arc<dyn TokenClient>,
    policy: AuthPolicy,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("backend", &self.client.backend_name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Authenticator {
    pub fn new(client: Arc<dyn TokenClient>, policy: AuthPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn authenticate<B>(
        &self,
        req: Option<&mut Request<B>>,
    ) -> Result<Verdict, AuthError> {
        let Some(req) = req else {
            return Ok(Verdict::Anonymous);
        };

        if headers::is_public(Some(&*req)) {
            tracing::debug!("public request, skipping authentication");
            return Ok(Verdict::Public);
        }

        headers::clean_request(Some(&mut *req));

        let Some(token_id) = extract_token_id(req) else {
            tracing::debug!("no access token on request");
            return Ok(Verdict::Anonymous);
        };

        let token = match resolve_access_token(self.client.as_ref(), &token_id).await {
            Ok(token) => token,
            Err(err) if err.is_not_found() => {
                if self.policy.reject_unknown_tokens {
                    tracing::warn!(
                        status = err.status,
                        error = %err.error,
                        "unknown access token rejected"
                    );
                    return Err(AuthError::unauthorized("invalid access token"));
                }
                tracing::debug!("access token not found, continuing as anonymous");
                return Ok(Verdict::Anonymous);
            }
            Err(err) => {
                tracing::warn!(
                    status = err.status,
                    error = %err.error,
                    message = %err.message,
                    kind = ?err.kind(),
                    "access token resolution failed"
                );
                return Err(err);
            }
        };

        if token.is_expired(Utc::now()) {
            tracing::debug!(expires = token.expires, "introspection returned an expired token");
        }

        headers::set_identity(req, &token);

        Ok(Verdict::Authenticated(Identity {
            caller_id: token.user_id,
            client_id: token.client_id,
        }))
    }
}

/// `access_token` query parameter only. Blank values count as missing.
fn extract_token_id<B>(req: &Request<B>) -> Option<String> {
    req.uri()
        .query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == PARAM_ACCESS_TOKEN)
                .map(|(_, value)| value.trim().to_string())
        })
        .filter(|token_id| !token_id.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::services::oauth::client::{ClientError, RawResponse};
    use crate::services::oauth::headers::{caller_id, client_id};

    const TOKEN_OK: &str = r#"{"access_token":"jimmy123","user_id":1,"client_id":2,"expires":123}"#;
    const TOKEN_NOT_FOUND: &str =
        r#"{"message":"token not exist","status":404,"error":"not found","causes":null}"#;
    const SERVER_ERROR: &str =
        r#"{"message":"server error","status":500,"error":"database error","causes":null}"#;

    struct Canned {
        status: u16,
        body: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenClient for Canned {
        fn backend_name(&self) -> &'static str {
            "canned"
        }

        async fn get_access_token(&self, token_id: &str) -> Result<RawResponse, ClientError> {
            self.calls.lock().unwrap().push(token_id.to_string());
            Ok(RawResponse {
                status: self.status,
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    fn authenticator(client: Arc<Canned>) -> Authenticator {
        Authenticator::new(client, AuthPolicy::default())
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn missing_request_has_no_verdict() {
        let client = Canned::new(200, TOKEN_OK);
        let verdict = authenticator(client.clone())
            .authenticate::<()>(None)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Anonymous);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn public_request_is_left_alone() {
        let client = Canned::new(200, TOKEN_OK);
        let mut req = Request::builder()
            .uri("http://localhost:8080?access_token=jimmy123")
            .header("X-Public", "true")
            .header("X-Caller-Id", "7")
            .body(())
            .unwrap();

        let verdict = authenticator(client.clone())
            .authenticate(Some(&mut req))
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Public);
        assert!(client.calls().is_empty());
        assert_eq!(caller_id(Some(&req)), Some(7));
    }

    #[tokio::test]
    async fn blank_access_token_has_no_verdict() {
        let client = Canned::new(200, TOKEN_OK);
        let mut req = get("http://localhost:8080?access_token=%20");

        let verdict = authenticator(client.clone())
            .authenticate(Some(&mut req))
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Anonymous);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn spoofed_identity_is_stripped_without_token() {
        let client = Canned::new(200, TOKEN_OK);
        let mut req = Request::builder()
            .uri("http://localhost:8080/")
            .header("X-Caller-Id", "1")
            .header("X-Client-Id", "1")
            .body(())
            .unwrap();

        authenticator(client)
            .authenticate(Some(&mut req))
            .await
            .unwrap();

        assert_eq!(caller_id(Some(&req)), None);
        assert_eq!(client_id(Some(&req)), None);
    }

    #[tokio::test]
    async fn resolved_token_sets_identity_headers() {
        let client = Canned::new(200, TOKEN_OK);
        let mut req = Request::builder()
            .uri("http://localhost:8080?access_token=jimmy123")
            .header("X-Caller-Id", "999")
            .body(())
            .unwrap();

        let verdict = authenticator(client.clone())
            .authenticate(Some(&mut req))
            .await
            .unwrap();

        assert_eq!(
            verdict,
            Verdict::Authenticated(Identity {
                caller_id: 1,
                client_id: 2,
            })
        );
        assert_eq!(client.calls(), vec!["jimmy123"]);
        assert_eq!(caller_id(Some(&req)), Some(1));
        assert_eq!(client_id(Some(&req)), Some(2));
    }

    #[tokio::test]
    async fn authorization_header_is_not_a_token_source() {
        let client = Canned::new(200, TOKEN_OK);
        let mut req = Request::builder()
            .uri("http://localhost:8080/")
            .header("Authorization", "Bearer jimmy123")
            .body(())
            .unwrap();

        let verdict = authenticator(client.clone())
            .authenticate(Some(&mut req))
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Anonymous);
        assert!(client.calls().is_empty());
        assert_eq!(caller_id(Some(&req)), None);
    }

    #[tokio::test]
    async fn not_found_passes_through_as_anonymous() {
        let client = Canned::new(404, TOKEN_NOT_FOUND);
        let mut req = get("http://localhost:8080?access_token=jimmy1234");

        let verdict = authenticator(client)
            .authenticate(Some(&mut req))
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Anonymous);
        assert_eq!(caller_id(Some(&req)), None);
    }

    #[tokio::test]
    async fn not_found_is_rejected_when_policy_says_so() {
        let client = Canned::new(404, TOKEN_NOT_FOUND);
        let auth = Authenticator::new(
            client,
            AuthPolicy {
                reject_unknown_tokens: true,
            },
        );
        let mut req = get("http://localhost:8080?access_token=jimmy1234");

        let err = auth.authenticate(Some(&mut req)).await.unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn server_error_is_returned() {
        let client = Canned::new(500, SERVER_ERROR);
        let mut req = get("http://localhost:8080?access_token=jimmy1234");

        let err = authenticator(client)
            .authenticate(Some(&mut req))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 500);
        assert_eq!(err.error, "database error");
    }

    #[test]
    fn token_id_comes_from_query_and_is_trimmed() {
        let req = Request::builder()
            .uri("/x?foo=bar&access_token=%20from-query%20")
            .header("Authorization", "Bearer from-header")
            .body(())
            .unwrap();

        assert_eq!(extract_token_id(&req).as_deref(), Some("from-query"));
    }

    #[test]
    fn missing_query_yields_no_token_id() {
        let req = Request::builder()
            .uri("/x?foo=bar")
            .header("Authorization", "Bearer from-header")
            .body(())
            .unwrap();

        assert_eq!(extract_token_id(&req), None);
    }
}
