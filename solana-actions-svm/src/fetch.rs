//! Preparing a transaction returned by an Action for the wallet to sign.
//!
//! An Action may return a transaction that is already partially signed by
//! the server, or one with no signers at all. In the first case every
//! signature except the user's must be present and valid. In the second the
//! fee payer and blockhash are replaced with the user's account and a fresh
//! blockhash.

use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::error::PrepareTransactionError;
use crate::ledger::ActionLedger;
use crate::transaction::ActionTransaction;

/// Decodes `transaction` and checks it is ready for `account` to sign.
///
/// When `account` is the only signer, its blockhash is refreshed from the
/// ledger.
///
/// # Errors
///
/// Returns [`PrepareTransactionError`] if the transaction cannot be decoded,
/// carries an invalid or missing third-party signature, has no recent
/// blockhash, or a fresh blockhash cannot be fetched.
pub async fn prepare_transaction<L: ActionLedger + ?Sized>(
    ledger: &L,
    account: &Pubkey,
    transaction: &str,
) -> Result<VersionedTransaction, PrepareTransactionError> {
    let transaction = ActionTransaction::from_base64(transaction)?;
    let num_required = usize::from(transaction.inner().message.header().num_required_signatures);

    if num_required == 0 {
        let blockhash = ledger.latest_blockhash().await?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(account = %account, "Setting fee payer and blockhash");
        return Ok(transaction.rebuild(account, blockhash)?.into_inner());
    }

    if *transaction.recent_blockhash() == Hash::default() {
        return Err(PrepareTransactionError::MissingRecentBlockhash);
    }

    let mut tx = transaction.into_inner();
    let message = tx.message.serialize();
    let keys = tx.message.static_account_keys();
    let default = Signature::default();
    let mut refresh = false;

    for (index, key) in keys.iter().take(num_required).enumerate() {
        let signature = tx.signatures.get(index).unwrap_or(&default);
        if *signature != default {
            if !signature.verify(key.as_ref(), &message) {
                return Err(PrepareTransactionError::InvalidSignature(*key));
            }
        } else if key == account {
            refresh = num_required == 1;
        } else {
            return Err(PrepareTransactionError::MissingSignature(*key));
        }
    }

    if refresh {
        let blockhash = ledger.latest_blockhash().await?;
        tx.message.set_recent_blockhash(blockhash);
        #[cfg(feature = "telemetry")]
        tracing::debug!(blockhash = %blockhash, "Refreshed recent blockhash");
    }

    Ok(tx)
}
