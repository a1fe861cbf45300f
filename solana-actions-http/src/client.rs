//! Client side of an Action: reading its metadata and fetching the
//! transaction it builds for an account.

use std::str::FromStr;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use serde_json::Value;
use solana_actions::spec::{ActionError, ActionGetResponse, ActionPostRequest, PostResponseLinks};
use solana_actions_svm::{ActionLedger, prepare_transaction};
use solana_pubkey::Pubkey;
use solana_transaction::versioned::VersionedTransaction;
use url::Url;

use crate::error::FetchTransactionError;

const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// A transaction returned by an Action, ready for the account to sign.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTransaction {
    /// Decoded transaction, with fee payer and blockhash prepared.
    pub transaction: VersionedTransaction,
    /// Message the Action returned with the transaction.
    pub message: Option<String>,
    /// Follow-up Action, if any.
    pub links: Option<PostResponseLinks>,
}

/// HTTP client for Action endpoints.
///
/// Wraps a [`reqwest::Client`] and the [`ActionLedger`] used to refresh
/// blockhashes of fetched transactions.
///
/// # Example
///
/// ```ignore
/// use solana_actions_http::client::ActionClient;
///
/// let client = ActionClient::new(rpc);
/// let fetched = client.fetch_transaction(&link, &request).await?;
/// ```
pub struct ActionClient<L> {
    http: reqwest::Client,
    ledger: L,
}

impl<L: ActionLedger> ActionClient<L> {
    /// Creates a client with a default [`reqwest::Client`].
    pub fn new(ledger: L) -> Self {
        Self {
            http: reqwest::Client::new(),
            ledger,
        }
    }

    /// Uses a preconfigured [`reqwest::Client`] (timeouts, proxies, ...).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns the ledger.
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Fetches the metadata of the Action at `link`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchTransactionError`] on network failure, a non-success
    /// status, or a body that is not an [`ActionGetResponse`].
    pub async fn get_action(&self, link: &Url) -> Result<ActionGetResponse, FetchTransactionError> {
        let response = self
            .http
            .get(link.clone())
            .header(ACCEPT, APPLICATION_JSON)
            .send()
            .await?;
        let body = read_json(response).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// POSTs `request` to the Action at `link` and prepares the returned
    /// transaction. See [`fetch_transaction`].
    ///
    /// # Errors
    ///
    /// See [`fetch_transaction`].
    pub async fn fetch_transaction(
        &self,
        link: &Url,
        request: &ActionPostRequest,
    ) -> Result<FetchedTransaction, FetchTransactionError> {
        fetch_transaction(&self.http, &self.ledger, link, request).await
    }
}

impl<L> std::fmt::Debug for ActionClient<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionClient")
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

/// POSTs `request` to the Action at `link` and prepares the returned
/// transaction for `request.account` to sign.
///
/// The response must carry a base64 `transaction` string. The transaction is
/// then checked with [`prepare_transaction`]: third-party signatures must be
/// valid, and a blockhash is fetched from `ledger` when the account is the
/// only signer.
///
/// # Errors
///
/// Returns [`FetchTransactionError::InvalidAccount`] before any request if
/// the account is not a public key, [`FetchTransactionError::MissingTransaction`]
/// or [`FetchTransactionError::InvalidTransaction`] for a malformed
/// response, and [`FetchTransactionError::Prepare`] if the transaction is
/// not ready for signing.
pub async fn fetch_transaction<L: ActionLedger + ?Sized>(
    http: &reqwest::Client,
    ledger: &L,
    link: &Url,
    request: &ActionPostRequest,
) -> Result<FetchedTransaction, FetchTransactionError> {
    let account = Pubkey::from_str(&request.account)
        .map_err(|_| FetchTransactionError::InvalidAccount(request.account.clone()))?;

    #[cfg(feature = "telemetry")]
    tracing::debug!(link = %link, account = %account, "Fetching action transaction");

    let response = http
        .post(link.clone())
        .header(ACCEPT, APPLICATION_JSON)
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .json(request)
        .send()
        .await?;
    let mut body = read_json(response).await?;

    let transaction = match body.get("transaction") {
        None | Some(Value::Null) => return Err(FetchTransactionError::MissingTransaction),
        Some(Value::String(encoded)) if encoded.is_empty() => {
            return Err(FetchTransactionError::MissingTransaction);
        }
        Some(Value::String(encoded)) => prepare_transaction(ledger, &account, encoded).await?,
        Some(_) => return Err(FetchTransactionError::InvalidTransaction),
    };

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let links = body
        .get_mut("links")
        .map(Value::take)
        .filter(|links| !links.is_null())
        .map(serde_json::from_value)
        .transpose()?;

    Ok(FetchedTransaction {
        transaction,
        message,
        links,
    })
}

/// Reads a JSON body, turning error statuses into [`FetchTransactionError::Status`].
async fn read_json(response: reqwest::Response) -> Result<Value, FetchTransactionError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ActionError>(&bytes).map_or_else(
            |_| String::from_utf8_lossy(&bytes).into_owned(),
            |error| error.message,
        );
        #[cfg(feature = "telemetry")]
        tracing::debug!(status = %status, message = %message, "Action request failed");
        return Err(FetchTransactionError::Status { status, message });
    }

    Ok(serde_json::from_slice(&bytes)?)
}
