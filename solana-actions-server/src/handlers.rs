//! Axum route handlers for the reference Actions.
//!
//! Serves a memo Action whose transactions carry an action identity memo,
//! plus an endpoint that checks a confirmed signature against that identity.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::{Deserialize, Serialize};
use solana_actions::spec::{
    ActionGetResponse, ActionLinks, ActionParameter, ActionParameterType, ActionPostRequest,
    ActionPostResponse, ActionRuleObject, ActionType, ActionsJson, LinkedAction,
};
use solana_actions_http::cors::actions_cors_layer;
use solana_actions_svm::{
    ActionLedger, ActionTransaction, ConfirmedSignatureInfo, CreatePostResponseArgs,
    MEMO_PROGRAM_PUBKEY, create_post_response, verify_signature_info_for_identity,
};
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_instruction::{AccountMeta, Instruction};
use solana_keypair::Keypair;
use solana_message::VersionedMessage;
use solana_message::v0::Message as MessageV0;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use url::Url;

use crate::error::ServerError;

/// Path of the memo Action.
pub const MEMO_ACTION_PATH: &str = "/api/actions/memo";

/// Longest memo text accepted by the memo Action, in characters.
pub const MAX_MEMO_CHARS: usize = 256;

/// Shared application state.
pub type SharedState = Arc<AppState>;

/// Everything the handlers need.
pub struct AppState {
    ledger: Arc<dyn ActionLedger>,
    identity: Option<Keypair>,
    headers: HeaderMap,
    memo_href: Url,
    icon: String,
    compute_unit_limit: u32,
}

impl AppState {
    /// Creates the state for a server reachable at `base_url`.
    ///
    /// `headers` are added to every Action response, see
    /// [`create_action_headers`](solana_actions_http::create_action_headers).
    ///
    /// # Errors
    ///
    /// Returns an error if the memo Action URL cannot be derived from
    /// `base_url`.
    pub fn new(
        ledger: Arc<dyn ActionLedger>,
        headers: HeaderMap,
        base_url: &Url,
    ) -> Result<Self, url::ParseError> {
        let memo_href = base_url.join(MEMO_ACTION_PATH)?;
        let icon: String = base_url.join("/solana_devs.jpg")?.into();
        Ok(Self {
            ledger,
            identity: None,
            headers,
            memo_href,
            icon,
            compute_unit_limit: 50_000,
        })
    }

    /// Tags memo transactions with `identity` and enables verification.
    #[must_use]
    pub fn with_identity(mut self, identity: Keypair) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the icon of the memo Action.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Sets the compute unit limit of memo transactions.
    #[must_use]
    pub const fn with_compute_unit_limit(mut self, limit: u32) -> Self {
        self.compute_unit_limit = limit;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("identity", &self.identity.as_ref().map(Signer::pubkey))
            .field("memo_href", &self.memo_href.as_str())
            .field("icon", &self.icon)
            .field("compute_unit_limit", &self.compute_unit_limit)
            .finish_non_exhaustive()
    }
}

/// Query of `POST /api/actions/memo`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoQuery {
    /// Text written on-chain.
    pub message: Option<String>,
}

/// Body of `POST /api/identity/verify`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyIdentityRequest {
    /// Base58 signature of the confirmed transaction.
    pub signature: String,
    /// Memo field reported by the RPC node for that signature.
    #[serde(default)]
    pub memo: Option<String>,
}

/// Response of `POST /api/identity/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyIdentityResponse {
    /// Whether the transaction was issued by this server.
    pub verified: bool,
    /// Base58 identity checked against.
    pub identity: String,
}

/// `GET /actions.json` - Maps website paths to Action API paths.
pub async fn get_actions_json() -> Json<ActionsJson> {
    Json(ActionsJson {
        rules: vec![
            ActionRuleObject::new("/*", "/api/actions/*"),
            ActionRuleObject::new("/api/actions/**", "/api/actions/**"),
        ],
    })
}

/// `GET /api/actions/memo` - Metadata of the memo Action.
pub async fn get_memo(State(state): State<SharedState>) -> Json<ActionGetResponse> {
    let href = format!("{}?message={{message}}", state.memo_href);
    Json(ActionGetResponse {
        action_type: Some(ActionType::Action),
        icon: state.icon.clone(),
        title: "Actions Example - Write Memo".to_owned(),
        description: "Write a message to the Solana network".to_owned(),
        label: "Write".to_owned(),
        disabled: None,
        links: Some(ActionLinks {
            actions: vec![
                LinkedAction::new(href, "Write Message").with_parameter(
                    ActionParameter::new("message")
                        .with_type(ActionParameterType::Textarea)
                        .with_label("Enter your message")
                        .with_bounds(1, MAX_MEMO_CHARS)
                        .required(),
                ),
            ],
        }),
        error: None,
    })
}

/// `POST /api/actions/memo?message=...` - Builds a memo transaction for the
/// posting account.
///
/// # Errors
///
/// Returns 400 for a missing or oversized message or an invalid account,
/// 502 if no blockhash can be fetched.
pub async fn post_memo(
    State(state): State<SharedState>,
    Query(query): Query<MemoQuery>,
    body: Result<Json<ActionPostRequest>, JsonRejection>,
) -> Result<Json<ActionPostResponse>, ServerError> {
    let text = validate_memo(query.message)?;
    let Json(request) = body.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    let account = Pubkey::from_str(&request.account).map_err(|_| ServerError::InvalidAccount)?;

    let blockhash = state.ledger.latest_blockhash().await?;

    let instructions = [
        ComputeBudgetInstruction::set_compute_unit_limit(state.compute_unit_limit),
        Instruction::new_with_bytes(
            MEMO_PROGRAM_PUBKEY,
            text.as_bytes(),
            vec![AccountMeta::new_readonly(account, true)],
        ),
    ];
    let message = MessageV0::try_compile(&account, &instructions, &[], blockhash)
        .map_err(|e| ServerError::Compile(e.to_string()))?;

    let mut args =
        CreatePostResponseArgs::new(ActionTransaction::from_message(VersionedMessage::V0(message)))
            .with_message(format!("Write memo: \"{text}\""));
    if let Some(identity) = &state.identity {
        args = args.with_action_identity(identity);
    }
    let response = create_post_response(args)?;

    tracing::info!(account = %account, "Built memo transaction");
    Ok(Json(response))
}

/// `POST /api/identity/verify` - Checks that a confirmed transaction was
/// issued by this server.
///
/// # Errors
///
/// Returns 400 for a malformed body or signature, 501 when the server has
/// no action identity.
pub async fn post_verify_identity(
    State(state): State<SharedState>,
    body: Result<Json<VerifyIdentityRequest>, JsonRejection>,
) -> Result<Json<VerifyIdentityResponse>, ServerError> {
    let Json(request) = body.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    let identity = state
        .identity
        .as_ref()
        .map(Signer::pubkey)
        .ok_or(ServerError::IdentityNotConfigured)?;
    let signature =
        Signature::from_str(&request.signature).map_err(|_| ServerError::InvalidSignature)?;

    let info = ConfirmedSignatureInfo {
        signature,
        slot: 0,
        memo: request.memo,
    };
    let verified = verify_signature_info_for_identity(&*state.ledger, &identity, &info).await;

    Ok(Json(VerifyIdentityResponse {
        verified,
        identity: identity.to_string(),
    }))
}

fn validate_memo(message: Option<String>) -> Result<String, ServerError> {
    let message = message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("Message is required".to_owned()))?;
    if message.chars().count() > MAX_MEMO_CHARS {
        return Err(ServerError::InvalidRequest(format!(
            "Message must be less than {MAX_MEMO_CHARS} characters"
        )));
    }
    Ok(message)
}

/// Adds the configured Action headers a handler did not set itself.
async fn apply_action_headers(State(state): State<SharedState>, mut response: Response) -> Response {
    for (name, value) in &state.headers {
        if !response.headers().contains_key(name) {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
    response
}

/// Creates an Axum [`Router`] with all Action endpoints.
///
/// Endpoints:
/// - `GET /actions.json` - website to Action path rules
/// - `GET /api/actions/memo` - memo Action metadata
/// - `POST /api/actions/memo` - memo transaction
/// - `POST /api/identity/verify` - action identity verification
///
/// Responses carry the state's headers. `OPTIONS` requests on any route are
/// answered by [`actions_cors_layer`].
pub fn action_router(state: SharedState) -> Router {
    Router::new()
        .route("/actions.json", get(get_actions_json))
        .route(MEMO_ACTION_PATH, get(get_memo).post(post_memo))
        .route("/api/identity/verify", post(post_verify_identity))
        .layer(middleware::map_response_with_state(
            Arc::clone(&state),
            apply_action_headers,
        ))
        .with_state(state)
        .layer(actions_cors_layer())
}
