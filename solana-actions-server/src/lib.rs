//! Reference Solana Actions server.
//!
//! Serves a memo Action whose transactions are tagged with the server's
//! action identity, and verifies confirmed signatures against it.
//!
//! # Modules
//!
//! - [`handlers`] - Axum route handlers and router builder
//! - [`error`] - Route error types
//! - [`config`] - Server configuration with environment variable expansion

pub mod config;
pub mod error;
pub mod handlers;

pub use handlers::{AppState, SharedState, action_router};
