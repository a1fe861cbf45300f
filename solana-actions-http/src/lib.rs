//! HTTP transport layer for Solana Actions.
//!
//! Provides the response headers every Action endpoint must send, a
//! (feature-gated) CORS middleware for tower-based servers, and a client
//! that fetches and prepares the transaction an Action returns.
//!
//! # Modules
//!
//! - [`headers`] - Standard Action response headers
//! - [`error`] - HTTP transport error types
//! - [`cors`] - CORS layer for Action routes (feature: `server`)
//! - [`client`] - Action client (feature: `client`)
//!
//! # Feature Flags
//!
//! - `client` - Enables [`client::ActionClient`], built on `reqwest`
//! - `server` - Enables [`cors::actions_cors_layer`], built on `tower-http`
//! - `telemetry` - Enables tracing instrumentation

pub mod error;
pub mod headers;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod cors;

pub use error::HttpError;
pub use headers::{ActionHeadersConfig, actions_cors_headers, create_action_headers};
