/// Factory: build `Authenticator` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::oauth::{AuthPolicy, Authenticator, HttpTokenClient};

pub fn build_authenticator(config: &Config) -> Result<Arc<Authenticator>, AppError> {
    let client = HttpTokenClient::new(config.oauth_base_url.clone(), config.oauth_timeout)
        .map_err(|err| {
            tracing::error!(error = %err, "failed to build token introspection client");
            AppError::Internal
        })?;

    let policy = AuthPolicy {
        reject_unknown_tokens: config.reject_unknown_tokens,
    };

    Ok(Arc::new(Authenticator::new(Arc::new(client), policy)))
}
