//! Access-token authentication middleware for axum services.
//!
//! Requests carrying an `access_token` are resolved against a token
//! introspection service (`GET <base>/oauth/access_token/<id>`); on success the
//! verified `X-Caller-Id` / `X-Client-Id` headers are attached. Client-supplied
//! identity headers are always dropped first. See [`services::oauth`].
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
