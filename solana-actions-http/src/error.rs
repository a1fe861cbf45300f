//! Error types for the HTTP transport layer.

/// Errors that can occur while building Action response headers.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// A configured value is not a legal header value.
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}

/// Errors returned by [`ActionClient`](crate::client::ActionClient).
#[cfg(feature = "client")]
#[derive(Debug, thiserror::Error)]
pub enum FetchTransactionError {
    /// The request could not be sent or its body could not be read.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Action answered with a non-success status.
    #[error("Action responded with {status}: {message}")]
    Status {
        /// HTTP status of the response.
        status: http::StatusCode,
        /// The `message` of the error body, or the raw body.
        message: String,
    },

    /// The response body is not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The posting account is not a valid public key.
    #[error("invalid account: {0}")]
    InvalidAccount(String),

    /// The response carries no `transaction`.
    #[error("missing transaction")]
    MissingTransaction,

    /// The response `transaction` is not a string.
    #[error("invalid transaction")]
    InvalidTransaction,

    /// The returned transaction is not ready for the account to sign.
    #[error(transparent)]
    Prepare(#[from] solana_actions_svm::PrepareTransactionError),
}
