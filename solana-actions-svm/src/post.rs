//! Building the body of an Action `POST` response.

use solana_actions::spec::{ActionPostResponse, LinkedActionType, PostResponseLinks};
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::error::PostResponseError;
use crate::identity::embed_identity;
use crate::transaction::ActionTransaction;

/// Inputs of [`create_post_response`].
pub struct CreatePostResponseArgs<'a> {
    /// Transaction returned to the wallet.
    pub transaction: ActionTransaction,
    /// Optional message shown alongside the transaction.
    pub message: Option<String>,
    /// Optional follow-up Action.
    pub links: Option<PostResponseLinks>,
    /// Extra signers that partially sign the transaction.
    pub signers: Vec<&'a dyn Signer>,
    /// Identity tagging the transaction with an identifier memo.
    pub action_identity: Option<&'a dyn Signer>,
    /// Reference for the identifier memo; random when `None`.
    pub reference: Option<Pubkey>,
}

impl<'a> CreatePostResponseArgs<'a> {
    /// Creates arguments for the given transaction with no extras.
    #[must_use]
    pub const fn new(transaction: ActionTransaction) -> Self {
        Self {
            transaction,
            message: None,
            links: None,
            signers: Vec::new(),
            action_identity: None,
            reference: None,
        }
    }

    /// Sets the response message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the follow-up links.
    #[must_use]
    pub fn with_links(mut self, links: PostResponseLinks) -> Self {
        self.links = Some(links);
        self
    }

    /// Adds a signer.
    #[must_use]
    pub fn with_signer(mut self, signer: &'a dyn Signer) -> Self {
        self.signers.push(signer);
        self
    }

    /// Tags the transaction with `identity`.
    #[must_use]
    pub fn with_action_identity(mut self, identity: &'a dyn Signer) -> Self {
        self.action_identity = Some(identity);
        self
    }

    /// Uses `reference` instead of a random one.
    #[must_use]
    pub fn with_reference(mut self, reference: Pubkey) -> Self {
        self.reference = Some(reference);
        self
    }
}

impl std::fmt::Debug for CreatePostResponseArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatePostResponseArgs")
            .field("transaction", &self.transaction)
            .field("message", &self.message)
            .field("links", &self.links)
            .field("signers", &self.signers.len())
            .field(
                "action_identity",
                &self.action_identity.map(|identity| identity.pubkey()),
            )
            .field("reference", &self.reference)
            .finish()
    }
}

/// Prepares the transaction and wraps it in an [`ActionPostResponse`].
///
/// With an action identity the identifier memo is embedded and the message
/// recompiled, keeping its version, fee payer and blockhash. The extra
/// signers then sign the final message.
///
/// # Errors
///
/// Returns [`PostResponseError`] if the transaction has no instructions,
/// the identity cannot be embedded, or signing or encoding fails.
pub fn create_post_response(
    args: CreatePostResponseArgs<'_>,
) -> Result<ActionPostResponse, PostResponseError> {
    let CreatePostResponseArgs {
        mut transaction,
        message,
        links,
        signers,
        action_identity,
        reference,
    } = args;

    if transaction.inner().message.instructions().is_empty() {
        return Err(PostResponseError::InstructionRequired);
    }

    if let Some(identity) = action_identity {
        let mut instructions = transaction.decompile_instructions()?;
        embed_identity(&mut instructions, identity, reference)?;
        transaction = transaction.recompile(&instructions)?;
    }

    for signer in signers {
        transaction = transaction.partial_sign(signer)?;
    }

    Ok(ActionPostResponse {
        response_type: Some(LinkedActionType::Transaction),
        transaction: transaction.as_base64()?,
        message,
        links,
    })
}
