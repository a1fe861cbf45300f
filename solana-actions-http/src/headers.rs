//! Standard headers of an Action endpoint response.
//!
//! Wallets and blink clients fetch Actions cross-origin, so every response
//! (including `OPTIONS` preflights) carries permissive CORS headers plus the
//! Action version and blockchain identifiers the server supports.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_TYPE,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use solana_actions::constants::resolve_blockchain_id;

use crate::error::HttpError;

/// `X-Action-Version` header name.
pub const X_ACTION_VERSION: HeaderName = HeaderName::from_static("x-action-version");

/// `X-Blockchain-Ids` header name.
pub const X_BLOCKCHAIN_IDS: HeaderName = HeaderName::from_static("x-blockchain-ids");

/// `X-Accept-Action-Version` request header name.
pub const X_ACCEPT_ACTION_VERSION: HeaderName =
    HeaderName::from_static("x-accept-action-version");

/// `X-Accept-Blockchain-Ids` request header name.
pub const X_ACCEPT_BLOCKCHAIN_IDS: HeaderName =
    HeaderName::from_static("x-accept-blockchain-ids");

/// Methods an Action endpoint answers.
pub const ALLOWED_METHODS: &str = "GET,POST,PUT,OPTIONS";

/// Request headers a client may send to an Action endpoint.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, Content-Encoding, Accept-Encoding, X-Accept-Action-Version, X-Accept-Blockchain-Ids";

/// Response headers exposed to browser clients.
pub const EXPOSED_HEADERS: &str = "X-Action-Version, X-Blockchain-Ids";

/// Options of [`create_action_headers`].
#[derive(Debug, Clone, Default)]
pub struct ActionHeadersConfig {
    /// Headers applied last, overriding the defaults.
    pub headers: Option<HeaderMap>,
    /// Chain the Action runs on: a cluster alias or a CAIP-2 identifier.
    pub chain_id: Option<String>,
    /// Action spec version implemented by the server.
    pub action_version: Option<String>,
}

impl ActionHeadersConfig {
    /// Sets the chain identifier.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Sets the Action version.
    #[must_use]
    pub fn with_action_version(mut self, version: impl Into<String>) -> Self {
        self.action_version = Some(version.into());
        self
    }

    /// Sets headers that override the defaults.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Returns the CORS headers every Action response carries.
#[must_use]
pub fn actions_cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Builds the headers of an Action response.
///
/// Starts from [`actions_cors_headers`], adds `X-Blockchain-Ids` (cluster
/// aliases resolved to CAIP-2) and `X-Action-Version` when configured, then
/// applies the caller's headers on top.
///
/// # Errors
///
/// Returns [`HttpError::InvalidHeaderValue`] if the chain id or version
/// contains characters not allowed in a header value.
pub fn create_action_headers(config: ActionHeadersConfig) -> Result<HeaderMap, HttpError> {
    let mut headers = actions_cors_headers();

    if let Some(chain_id) = config.chain_id.as_deref().filter(|c| !c.is_empty()) {
        headers.insert(
            X_BLOCKCHAIN_IDS,
            HeaderValue::from_str(resolve_blockchain_id(chain_id))?,
        );
    }
    if let Some(version) = config.action_version.as_deref().filter(|v| !v.is_empty()) {
        headers.insert(X_ACTION_VERSION, HeaderValue::from_str(version)?);
    }
    if let Some(overrides) = config.headers {
        headers.extend(overrides);
    }

    Ok(headers)
}
