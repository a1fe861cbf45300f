//! Versioned transaction wrapper used when building and preparing Action
//! transactions.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use solana_instruction::{AccountMeta, Instruction};
use solana_message::v0::Message as MessageV0;
use solana_message::{Hash, Message as LegacyMessage, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;

use crate::error::ActionTransactionError;

/// Wrapper around a versioned Solana transaction with helper methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTransaction {
    inner: VersionedTransaction,
}

impl ActionTransaction {
    /// Creates a new transaction wrapper.
    #[must_use]
    pub const fn new(transaction: VersionedTransaction) -> Self {
        Self { inner: transaction }
    }

    /// Wraps an unsigned message, reserving one empty signature per
    /// required signer.
    #[must_use]
    pub fn from_message(message: VersionedMessage) -> Self {
        let num_required = usize::from(message.header().num_required_signatures);
        Self {
            inner: VersionedTransaction {
                signatures: vec![Signature::default(); num_required],
                message,
            },
        }
    }

    /// Decodes a base64 bincode-serialized transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTransactionError::Decoding`] on invalid base64 or bincode.
    pub fn from_base64(encoded: &str) -> Result<Self, ActionTransactionError> {
        let bytes = b64
            .decode(encoded)
            .map_err(|e| ActionTransactionError::Decoding(e.to_string()))?;
        let inner = bincode::deserialize::<VersionedTransaction>(&bytes)
            .map_err(|e| ActionTransactionError::Decoding(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Returns the inner transaction.
    #[must_use]
    pub const fn inner(&self) -> &VersionedTransaction {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner transaction.
    #[must_use]
    pub fn into_inner(self) -> VersionedTransaction {
        self.inner
    }

    /// Returns the fee payer, the first static account key.
    #[must_use]
    pub fn fee_payer(&self) -> Option<Pubkey> {
        self.inner.message.static_account_keys().first().copied()
    }

    /// Returns the recent blockhash of the message.
    #[must_use]
    pub fn recent_blockhash(&self) -> &Hash {
        self.inner.message.recent_blockhash()
    }

    /// Returns `true` for legacy (unversioned) messages.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self.inner.message, VersionedMessage::Legacy(_))
    }

    /// Checks if the transaction is fully signed.
    #[must_use]
    pub fn is_fully_signed(&self) -> bool {
        let num_required = usize::from(self.inner.message.header().num_required_signatures);
        if self.inner.signatures.len() < num_required {
            return false;
        }
        let default = Signature::default();
        self.inner.signatures.iter().all(|s| *s != default)
    }

    /// Signs the message with `signer`, placing the signature at the
    /// signer's position among the required signers.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTransactionError`] if signing fails or the signer is
    /// not a required signer.
    pub fn partial_sign<S: Signer + ?Sized>(self, signer: &S) -> Result<Self, ActionTransactionError> {
        let mut tx = self.inner;
        let msg_bytes = tx.message.serialize();
        let signature = signer
            .try_sign_message(msg_bytes.as_slice())
            .map_err(|e| ActionTransactionError::Signing(format!("{e}")))?;

        let num_required = usize::from(tx.message.header().num_required_signatures);
        let signer_pubkey = signer.pubkey();
        let pos = tx
            .message
            .static_account_keys()
            .iter()
            .take(num_required)
            .position(|k| *k == signer_pubkey)
            .ok_or(ActionTransactionError::SignerNotRequired(signer_pubkey))?;

        if tx.signatures.len() < num_required {
            tx.signatures.resize(num_required, Signature::default());
        }
        tx.signatures[pos] = signature;
        Ok(Self { inner: tx })
    }

    /// Encodes the transaction to base64.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTransactionError::Encoding`] if serialization fails.
    pub fn as_base64(&self) -> Result<String, ActionTransactionError> {
        let bytes = bincode::serialize(&self.inner)
            .map_err(|e| ActionTransactionError::Encoding(e.to_string()))?;
        Ok(b64.encode(bytes))
    }

    /// Resolves the compiled instructions back into [`Instruction`]s.
    ///
    /// Signer and writable flags are derived from the message header.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTransactionError`] if the message uses address lookup
    /// tables or references an account index out of range.
    pub fn decompile_instructions(&self) -> Result<Vec<Instruction>, ActionTransactionError> {
        let message = &self.inner.message;
        if message
            .address_table_lookups()
            .is_some_and(|lookups| !lookups.is_empty())
        {
            return Err(ActionTransactionError::AddressLookupTablesUnsupported);
        }

        let keys = message.static_account_keys();
        let header = message.header();
        let num_signed = usize::from(header.num_required_signatures);
        let num_writable_signed =
            num_signed.saturating_sub(usize::from(header.num_readonly_signed_accounts));
        let num_writable_unsigned =
            keys.len().saturating_sub(usize::from(header.num_readonly_unsigned_accounts));
        let key_at = |index: u8| {
            keys.get(usize::from(index))
                .copied()
                .ok_or(ActionTransactionError::NoAccountAtIndex(index))
        };

        message
            .instructions()
            .iter()
            .map(|compiled| -> Result<Instruction, ActionTransactionError> {
                let program_id = key_at(compiled.program_id_index)?;
                let accounts = compiled
                    .accounts
                    .iter()
                    .map(|&index| -> Result<AccountMeta, ActionTransactionError> {
                        let pubkey = key_at(index)?;
                        let i = usize::from(index);
                        let is_signer = i < num_signed;
                        let is_writable = if is_signer {
                            i < num_writable_signed
                        } else {
                            i < num_writable_unsigned
                        };
                        Ok(AccountMeta {
                            pubkey,
                            is_signer,
                            is_writable,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Instruction {
                    program_id,
                    accounts,
                    data: compiled.data.clone(),
                })
            })
            .collect()
    }

    /// Compiles `instructions` into a new unsigned transaction with the same
    /// message version, fee payer and blockhash.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTransactionError`] if the message has no fee payer or
    /// fails to compile.
    pub fn recompile(&self, instructions: &[Instruction]) -> Result<Self, ActionTransactionError> {
        let payer = self
            .fee_payer()
            .ok_or(ActionTransactionError::MissingFeePayer)?;
        self.compile(&payer, *self.recent_blockhash(), instructions)
    }

    /// Rebuilds this transaction for a different fee payer and blockhash,
    /// keeping its instructions and message version.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTransactionError`] if decompiling or compiling fails.
    pub fn rebuild(&self, payer: &Pubkey, blockhash: Hash) -> Result<Self, ActionTransactionError> {
        let instructions = self.decompile_instructions()?;
        self.compile(payer, blockhash, &instructions)
    }

    fn compile(
        &self,
        payer: &Pubkey,
        blockhash: Hash,
        instructions: &[Instruction],
    ) -> Result<Self, ActionTransactionError> {
        let message = if self.is_legacy() {
            VersionedMessage::Legacy(LegacyMessage::new_with_blockhash(
                instructions,
                Some(payer),
                &blockhash,
            ))
        } else {
            VersionedMessage::V0(
                MessageV0::try_compile(payer, instructions, &[], blockhash)
                    .map_err(|e| ActionTransactionError::Compile(format!("{e:?}")))?,
            )
        };
        Ok(Self::from_message(message))
    }
}

impl From<VersionedTransaction> for ActionTransaction {
    fn from(transaction: VersionedTransaction) -> Self {
        Self::new(transaction)
    }
}

impl From<ActionTransaction> for VersionedTransaction {
    fn from(transaction: ActionTransaction) -> Self {
        transaction.inner
    }
}
