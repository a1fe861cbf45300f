//! CORS middleware for Action routes.

use http::Method;
use http::header::{ACCEPT_ENCODING, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use tower_http::cors::{Any, CorsLayer};

use crate::headers::{X_ACCEPT_ACTION_VERSION, X_ACCEPT_BLOCKCHAIN_IDS, X_ACTION_VERSION, X_BLOCKCHAIN_IDS};

/// Returns a [`CorsLayer`] granting the same access as
/// [`actions_cors_headers`](crate::headers::actions_cors_headers).
///
/// Preflight requests are answered by the layer itself, so routes only need
/// to handle `GET` and `POST`.
#[must_use]
pub fn actions_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            CONTENT_ENCODING,
            ACCEPT_ENCODING,
            X_ACCEPT_ACTION_VERSION,
            X_ACCEPT_BLOCKCHAIN_IDS,
        ])
        .expose_headers([X_ACTION_VERSION, X_BLOCKCHAIN_IDS])
}
