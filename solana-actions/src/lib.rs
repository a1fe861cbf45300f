#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for Solana Actions and blinks.
//!
//! Solana Actions are HTTP endpoints that return signable Solana
//! transactions. Wallets discover an Action through a `solana-action:` URL
//! (or a blink wrapping one), fetch its metadata with `GET`, and `POST` the
//! user's account to receive a transaction.
//!
//! This crate is chain-client agnostic: it holds the wire types, the URL
//! codec and the sign-message helpers. Transaction building and the action
//! identity protocol live in `solana-actions-svm`; HTTP headers and the
//! client live in `solana-actions-http`.
//!
//! # Modules
//!
//! - [`constants`] - Protocol constants, blockchain ids and header names
//! - [`error`] - URL codec errors
//! - [`sign_message`] - Sign-message text creation, parsing and verification
//! - [`spec`] - Request/response types of the Actions API
//! - [`uri`] - Encoding and parsing of Action and blink URLs
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod constants;
pub mod error;
pub mod sign_message;
pub mod spec;
pub mod uri;

pub use error::{EncodeUrlError, ParseUrlError};
pub use uri::{ActionRequestUrl, ActionUrl, BlinkUrl, SupportedProtocol, encode_url, parse_url};
