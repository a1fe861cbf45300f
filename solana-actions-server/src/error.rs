//! Error types for the Action routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use solana_actions::spec::ActionError;
use solana_actions_svm::{LedgerError, PostResponseError};

/// Errors returned by Action route handlers.
///
/// Every variant is rendered as an [`ActionError`] body.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The request body or query is malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The posted account is not a public key.
    #[error("Invalid \"account\" provided")]
    InvalidAccount,

    /// The posted signature is not a base58 signature.
    #[error("Invalid \"signature\" provided")]
    InvalidSignature,

    /// The server has no action identity to verify against.
    #[error("Action identity is not configured")]
    IdentityNotConfigured,

    /// The transaction message could not be compiled.
    #[error("Can not compile transaction: {0}")]
    Compile(String),

    /// Building the POST response failed.
    #[error(transparent)]
    PostResponse(#[from] PostResponseError),

    /// The ledger could not be reached.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) | Self::InvalidAccount | Self::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            Self::IdentityNotConfigured => StatusCode::NOT_IMPLEMENTED,
            Self::Ledger(_) => StatusCode::BAD_GATEWAY,
            Self::Compile(_) | Self::PostResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Action request failed");
        }
        (status, Json(ActionError::new(self.to_string()))).into_response()
    }
}
