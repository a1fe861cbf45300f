//! Protocol-level constants for Solana Actions and blinks.

/// Scheme (without the trailing colon) an Action `link` must use.
pub const HTTPS_PROTOCOL: &str = "https";

/// Base58 address of the SPL Memo program.
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Query parameter used by interstitial websites to carry an encoded Action URL.
///
/// Example: `https://dial.to/?action=solana-action:https://jupiter.dial.to/swap/SOL-Bonk`
pub const BLINKS_QUERY_PARAM: &str = "action";

/// Maximum accepted length of a URL string handed to [`parse_url`](crate::uri::parse_url).
pub const MAX_URL_LENGTH: usize = 2048;

/// Upper bound on the payload of a single memo instruction.
///
/// See <https://spl.solana.com/memo#compute-limits>.
pub const MAX_MEMO_BYTES: usize = 566;

/// Query parameter carrying the human-readable label of an Action URL.
pub const LABEL_QUERY_PARAM: &str = "label";

/// Query parameter carrying the message of an Action URL.
pub const MESSAGE_QUERY_PARAM: &str = "message";

/// CAIP-2 identifier of Solana mainnet-beta.
pub const SOLANA_MAINNET: &str = "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";

/// CAIP-2 identifier of Solana devnet.
pub const SOLANA_DEVNET: &str = "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1";

/// CAIP-2 identifier of Solana testnet.
pub const SOLANA_TESTNET: &str = "solana:4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z";

/// Well-known cluster aliases and their CAIP-2 identifiers.
///
/// See <https://namespaces.chainagnostic.org/solana/caip10>.
pub static BLOCKCHAIN_IDS: &[(&str, &str)] = &[
    ("mainnet", SOLANA_MAINNET),
    ("devnet", SOLANA_DEVNET),
    ("testnet", SOLANA_TESTNET),
];

/// Resolves a cluster alias (`mainnet`, `devnet`, `testnet`) to its CAIP-2
/// identifier. Anything else is returned unchanged.
#[must_use]
pub fn resolve_blockchain_id(chain_id: &str) -> &str {
    BLOCKCHAIN_IDS
        .iter()
        .find(|(alias, _)| *alias == chain_id)
        .map_or(chain_id, |(_, caip2)| caip2)
}

/// Response header announcing the Action spec version implemented by a server.
pub const ACTION_VERSION_HEADER: &str = "X-Action-Version";

/// Response header listing the blockchains an Action server supports.
pub const BLOCKCHAIN_IDS_HEADER: &str = "X-Blockchain-Ids";

/// Request header a client uses to announce accepted Action spec versions.
pub const ACCEPT_ACTION_VERSION_HEADER: &str = "X-Accept-Action-Version";

/// Request header a client uses to announce accepted blockchains.
pub const ACCEPT_BLOCKCHAIN_IDS_HEADER: &str = "X-Accept-Blockchain-Ids";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_blockchain_id_aliases() {
        assert_eq!(resolve_blockchain_id("mainnet"), SOLANA_MAINNET);
        assert_eq!(resolve_blockchain_id("devnet"), SOLANA_DEVNET);
        assert_eq!(resolve_blockchain_id("testnet"), SOLANA_TESTNET);
    }

    #[test]
    fn test_resolve_blockchain_id_passthrough() {
        assert_eq!(resolve_blockchain_id("solana:custom"), "solana:custom");
        assert_eq!(resolve_blockchain_id(""), "");
    }
}
