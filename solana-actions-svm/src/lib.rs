#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Solana support for Solana Actions.
//!
//! This crate builds the transactions an Action server returns and checks
//! the ones a client receives. It also implements the action identity
//! protocol: a signed memo that ties a transaction to the Action provider
//! that built it.
//!
//! # Modules
//!
//! - [`identity`] - Identifier memos: creation, embedding and verification
//! - [`transaction`] - [`ActionTransaction`], a versioned transaction wrapper
//! - [`post`] - Building an [`ActionPostResponse`](solana_actions::spec::ActionPostResponse)
//! - [`fetch`] - Preparing a transaction returned by an Action for signing
//! - [`ledger`] - The [`ActionLedger`] lookup capability
//!
//! # Feature Flags
//!
//! - `rpc` - Implements [`ActionLedger`] for the nonblocking Solana RPC client
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring
//!
//! # Example
//!
//! ```ignore
//! use solana_actions_svm::{ActionTransaction, CreatePostResponseArgs, create_post_response};
//!
//! let response = create_post_response(
//!     CreatePostResponseArgs::new(ActionTransaction::from_message(message))
//!         .with_action_identity(&identity)
//!         .with_message("Thanks!"),
//! )?;
//! ```

pub mod error;
pub mod fetch;
pub mod identity;
pub mod ledger;
pub mod post;
pub mod transaction;

pub use error::{
    ActionTransactionError, IdentityError, LedgerError, PostResponseError, PrepareTransactionError,
};
pub use fetch::prepare_transaction;
pub use identity::{
    ActionIdentifier, IdentifierInstruction, MEMO_PROGRAM_PUBKEY, ValidatedIdentifier,
    create_identifier_instruction, create_identifier_memo, embed_identity, try_parse_candidate,
    validate_identifier_memo, validate_identifier_memos, verify_signature_info_for_identity,
};
pub use ledger::{ActionLedger, ConfirmedSignatureInfo};
pub use post::{CreatePostResponseArgs, create_post_response};
pub use transaction::ActionTransaction;
