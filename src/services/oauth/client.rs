//! Transport to the token introspection service.
//!
//! The resolver only needs "status + body" from the remote side, so the
//! transport is kept behind `TokenClient`. Production uses `HttpTokenClient`;
//! tests can swap in anything that implements the trait.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Raw remote answer. Parsing is the resolver's job.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("introspection base url cannot take path segments")]
    InvalidBaseUrl,
    #[error("introspection request timed out")]
    Timeout,
    #[error("introspection request failed: {0}")]
    Transport(String),
}

/// Shared by every in-flight request; implementations must be safe for that.
#[async_trait]
pub trait TokenClient: Send + Sync + 'static {
    // Backend name for logs.
    fn backend_name(&self) -> &'static str;

    // GET the token record for `token_id`.
    async fn get_access_token(&self, token_id: &str) -> Result<RawResponse, ClientError>;
}

/// `reqwest` backed client for `GET <base>/oauth/access_token/<id>`.
#[derive(Clone, Debug)]
pub struct HttpTokenClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTokenClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn token_url(&self, token_id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl)?
            .pop_if_empty()
            .extend(["oauth", "access_token", token_id]);
        Ok(url)
    }
}

#[async_trait]
impl TokenClient for HttpTokenClient {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn get_access_token(&self, token_id: &str) -> Result<RawResponse, ClientError> {
        let url = self.token_url(token_id)?;

        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpTokenClient {
        HttpTokenClient::new(Url::parse(base).unwrap(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn token_url_appends_path() {
        let url = client("http://localhost:8080").token_url("jimmy123").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/oauth/access_token/jimmy123");
    }

    #[test]
    fn token_url_keeps_base_path_and_trailing_slash() {
        let url = client("http://auth.internal/api/").token_url("abc").unwrap();
        assert_eq!(url.as_str(), "http://auth.internal/api/oauth/access_token/abc");
    }

    #[test]
    fn token_id_is_percent_encoded() {
        let url = client("http://localhost:8080").token_url("a/b c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/oauth/access_token/a%2Fb%20c");
    }

    #[test]
    fn success_range() {
        let ok = RawResponse {
            status: 204,
            body: Bytes::new(),
        };
        let redirect = RawResponse {
            status: 300,
            body: Bytes::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
