//! Error types for Solana transaction handling and the action identity protocol.
//!
//! Construction failures are surfaced through these types. Identity
//! verification never errors: it degrades to "not verified" instead.

use solana_pubkey::Pubkey;

/// Errors building or embedding an action identifier.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The instruction list is empty.
    #[error("at least 1 instruction required")]
    InstructionRequired,
    /// Every instruction targets the memo program.
    #[error("transaction requires at least 1 non-memo instruction")]
    NonMemoInstructionRequired,
    /// The identity signer failed to sign the reference.
    #[error("Can not sign reference: {0}")]
    Signing(String),
}

/// Errors decoding, signing or rebuilding an [`ActionTransaction`](crate::ActionTransaction).
#[derive(Debug, thiserror::Error)]
pub enum ActionTransactionError {
    /// Transaction could not be deserialized.
    #[error("Can not decode transaction: {0}")]
    Decoding(String),
    /// Transaction could not be serialized.
    #[error("Can not encode transaction to base64: {0}")]
    Encoding(String),
    /// A signer failed to produce a signature.
    #[error("Can not sign transaction: {0}")]
    Signing(String),
    /// The signer is not one of the message's required signers.
    #[error("Signer {0} not found in required signers")]
    SignerNotRequired(Pubkey),
    /// The message resolves accounts through address lookup tables.
    #[error("Address lookup tables are not supported")]
    AddressLookupTablesUnsupported,
    /// A compiled instruction references a missing account key.
    #[error("No account at index {0}")]
    NoAccountAtIndex(u8),
    /// The message has no account keys, hence no fee payer.
    #[error("missing fee payer")]
    MissingFeePayer,
    /// The message could not be compiled.
    #[error("Can not compile message: {0}")]
    Compile(String),
}

/// Errors creating an Action POST response.
#[derive(Debug, thiserror::Error)]
pub enum PostResponseError {
    /// The transaction has no instructions.
    #[error("at least 1 instruction is required")]
    InstructionRequired,
    /// The action identity could not be embedded.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// The transaction could not be rebuilt, signed or encoded.
    #[error(transparent)]
    Transaction(#[from] ActionTransactionError),
}

/// Errors looking up records on the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The RPC request failed.
    #[error("RPC request failed: {0}")]
    Rpc(String),
    /// The RPC returned a record that could not be interpreted.
    #[error("Invalid ledger record: {0}")]
    InvalidRecord(String),
}

/// Errors preparing a transaction returned by an Action for signing.
#[derive(Debug, thiserror::Error)]
pub enum PrepareTransactionError {
    /// The transaction could not be decoded or rebuilt.
    #[error(transparent)]
    Transaction(#[from] ActionTransactionError),
    /// The message has signers but a default blockhash.
    #[error("missing recent blockhash")]
    MissingRecentBlockhash,
    /// A present signature does not verify.
    #[error("invalid signature for {0}")]
    InvalidSignature(Pubkey),
    /// A signature other than the account's is absent.
    #[error("missing signature for {0}")]
    MissingSignature(Pubkey),
    /// The fresh blockhash could not be fetched.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
