//! Ledger lookups needed to verify identities and prepare transactions.
//!
//! [`ActionLedger`] is the only async seam of this crate. The `rpc` feature
//! implements it for the nonblocking Solana [`RpcClient`](solana_client::nonblocking::rpc_client::RpcClient);
//! tests and custom indexers can provide their own implementation.

use std::sync::Arc;

use async_trait::async_trait;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;

use crate::error::LedgerError;

/// A confirmed transaction signature referencing some address, together
/// with the memo the node reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedSignatureInfo {
    /// Transaction signature.
    pub signature: Signature,
    /// Slot the transaction was confirmed in.
    pub slot: u64,
    /// Memo text as reported by the RPC node, if any.
    ///
    /// Nodes concatenate multiple memos with `; ` and may prefix each with a
    /// `[<length>] ` marker.
    pub memo: Option<String>,
}

/// Read access to the ledger.
#[async_trait]
pub trait ActionLedger: Send + Sync {
    /// Returns the most recent confirmed signature of a transaction that
    /// references `address`, if any.
    async fn latest_reference_signature(
        &self,
        address: &Pubkey,
    ) -> Result<Option<ConfirmedSignatureInfo>, LedgerError>;

    /// Returns a recent blockhash usable for a new transaction.
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;
}

#[async_trait]
impl<T: ActionLedger + ?Sized> ActionLedger for Arc<T> {
    async fn latest_reference_signature(
        &self,
        address: &Pubkey,
    ) -> Result<Option<ConfirmedSignatureInfo>, LedgerError> {
        (**self).latest_reference_signature(address).await
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        (**self).latest_blockhash().await
    }
}

#[cfg(feature = "rpc")]
mod rpc {
    use std::str::FromStr;

    use async_trait::async_trait;
    use solana_client::nonblocking::rpc_client::RpcClient;
    use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
    use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
    use solana_commitment_config::CommitmentConfig;
    use solana_message::Hash;
    use solana_pubkey::Pubkey;
    use solana_signature::Signature;

    use super::{ActionLedger, ConfirmedSignatureInfo};
    use crate::error::LedgerError;

    impl TryFrom<RpcConfirmedTransactionStatusWithSignature> for ConfirmedSignatureInfo {
        type Error = LedgerError;

        fn try_from(record: RpcConfirmedTransactionStatusWithSignature) -> Result<Self, Self::Error> {
            let signature = Signature::from_str(&record.signature)
                .map_err(|e| LedgerError::InvalidRecord(format!("{}: {e}", record.signature)))?;
            Ok(Self {
                signature,
                slot: record.slot,
                memo: record.memo,
            })
        }
    }

    #[async_trait]
    impl ActionLedger for RpcClient {
        async fn latest_reference_signature(
            &self,
            address: &Pubkey,
        ) -> Result<Option<ConfirmedSignatureInfo>, LedgerError> {
            let config = GetConfirmedSignaturesForAddress2Config {
                before: None,
                until: None,
                limit: Some(1),
                commitment: Some(CommitmentConfig::confirmed()),
            };
            let records = self
                .get_signatures_for_address_with_config(address, config)
                .await
                .map_err(|e| LedgerError::Rpc(e.to_string()))?;
            records
                .into_iter()
                .next()
                .map(ConfirmedSignatureInfo::try_from)
                .transpose()
        }

        async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
            self.get_latest_blockhash()
                .await
                .map_err(|e| LedgerError::Rpc(e.to_string()))
        }
    }
}
