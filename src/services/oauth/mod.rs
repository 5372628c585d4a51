pub mod authenticator;
pub mod client;
pub mod error;
pub mod factory;
pub mod headers;
pub mod resolver;
pub mod token;

pub use authenticator::{AuthPolicy, Authenticator, Identity, Verdict};
pub use client::{HttpTokenClient, TokenClient};
pub use error::{AuthError, AuthErrorKind};
pub use factory::build_authenticator;
pub use token::AccessToken;
