//! Action identity protocol.
//!
//! An Action provider proves it built a transaction by embedding an
//! *identifier memo*:
//!
//! ```text
//! solana-action:<identity>:<reference>:<signature>
//! ```
//!
//! `identity` is the provider's public key, `reference` a single-use public
//! key and `signature` the identity's Ed25519 signature over the 32 bytes of
//! `reference`, all base58. The memo goes into a memo instruction and both
//! keys are attached as read-only accounts to the first non-memo
//! instruction, so the transaction can later be found on the ledger by its
//! reference.
//!
//! Verification recovers the reference from the memo reported by an RPC
//! node and checks that the most recent transaction referencing it is the
//! one being verified. A replayed memo therefore fails: its reference points
//! at the original transaction.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use solana_instruction::{AccountMeta, Instruction};
use solana_keypair::Keypair;
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_signer::Signer;

use crate::error::IdentityError;
use crate::ledger::{ActionLedger, ConfirmedSignatureInfo};

/// SPL Memo program public key.
pub const MEMO_PROGRAM_PUBKEY: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Protocol tag at the start of every identifier memo.
pub const ACTION_IDENTITY_PROTOCOL: &str = "solana-action";

/// Field separator of an identifier memo.
pub const ACTION_IDENTITY_SEPARATOR: char = ':';

/// Separator between memos in the RPC `memo` field.
pub const MEMO_LIST_SEPARATOR: char = ';';

/// `[<length>] ` prefix RPC nodes put in front of each memo.
static LENGTH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\d+\] ").expect("Invalid memo length prefix pattern"));

/// Cheap shape check before splitting a candidate into fields.
static IDENTIFIER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w-]+:){2,}").expect("Invalid identifier shape pattern"));

/// A decoded identifier memo. Not yet verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionIdentifier {
    /// Public key of the Action provider.
    pub identity: Pubkey,
    /// Single-use correlation key.
    pub reference: Pubkey,
    /// Identity's signature over the reference bytes.
    pub signature: Signature,
}

impl ActionIdentifier {
    /// Checks the signature over `reference` against `identity`.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.signature
            .verify(self.identity.as_ref(), self.reference.as_ref())
    }
}

impl fmt::Display for ActionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ACTION_IDENTITY_PROTOCOL}{sep}{}{sep}{}{sep}{}",
            self.identity,
            self.reference,
            self.signature,
            sep = ACTION_IDENTITY_SEPARATOR
        )
    }
}

/// An identifier memo that passed verification for the expected identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedIdentifier {
    /// Reference recovered from the memo.
    pub reference: Pubkey,
}

/// Output of [`create_identifier_instruction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierInstruction {
    /// Memo text carried by the instruction.
    pub memo: String,
    /// Reference used in the memo.
    pub reference: Pubkey,
    /// Memo program instruction with no account keys.
    pub instruction: Instruction,
}

/// Signs `reference` with `identity` and renders the identifier memo.
///
/// # Errors
///
/// Returns [`IdentityError::Signing`] if the signer fails.
pub fn create_identifier_memo<S: Signer + ?Sized>(
    identity: &S,
    reference: &Pubkey,
) -> Result<String, IdentityError> {
    let signature = identity
        .try_sign_message(reference.as_ref())
        .map_err(|e| IdentityError::Signing(format!("{e}")))?;
    let identifier = ActionIdentifier {
        identity: identity.pubkey(),
        reference: *reference,
        signature,
    };
    Ok(identifier.to_string())
}

/// Builds the memo instruction tagging a transaction with `identity`.
///
/// A fresh reference is generated when none is given.
///
/// # Errors
///
/// Returns [`IdentityError::Signing`] if the signer fails.
pub fn create_identifier_instruction<S: Signer + ?Sized>(
    identity: &S,
    reference: Option<Pubkey>,
) -> Result<IdentifierInstruction, IdentityError> {
    let reference = reference.unwrap_or_else(|| Keypair::new().pubkey());
    let memo = create_identifier_memo(identity, &reference)?;
    let instruction = Instruction {
        program_id: MEMO_PROGRAM_PUBKEY,
        accounts: Vec::new(),
        data: memo.as_bytes().to_vec(),
    };
    Ok(IdentifierInstruction {
        memo,
        reference,
        instruction,
    })
}

/// Appends the identifier memo instruction to `instructions` and attaches
/// `identity` and the reference as read-only, non-signer accounts to the
/// first non-memo instruction.
///
/// Returns the reference used. `instructions` is left untouched on error.
///
/// # Errors
///
/// Returns [`IdentityError`] if `instructions` is empty, holds only memo
/// instructions, or signing fails.
pub fn embed_identity<S: Signer + ?Sized>(
    instructions: &mut Vec<Instruction>,
    identity: &S,
    reference: Option<Pubkey>,
) -> Result<Pubkey, IdentityError> {
    if instructions.is_empty() {
        return Err(IdentityError::InstructionRequired);
    }
    let target_index = instructions
        .iter()
        .position(|ix| ix.program_id != MEMO_PROGRAM_PUBKEY)
        .ok_or(IdentityError::NonMemoInstructionRequired)?;

    let IdentifierInstruction {
        reference,
        instruction,
        ..
    } = create_identifier_instruction(identity, reference)?;

    instructions.push(instruction);
    let accounts = &mut instructions[target_index].accounts;
    accounts.push(AccountMeta::new_readonly(identity.pubkey(), false));
    accounts.push(AccountMeta::new_readonly(reference, false));

    #[cfg(feature = "telemetry")]
    tracing::debug!(
        identity = %identity.pubkey(),
        reference = %reference,
        target_index,
        "Embedded action identity"
    );

    Ok(reference)
}

/// Decodes one memo candidate as reported by an RPC node.
///
/// The candidate is trimmed and stripped of a `[<length>] ` prefix. Returns
/// `None` unless it has exactly four fields with a valid identity,
/// reference and signature. The signature is not checked here.
#[must_use]
pub fn try_parse_candidate(candidate: &str) -> Option<ActionIdentifier> {
    let candidate = LENGTH_PREFIX.replace(candidate.trim(), "");
    if !IDENTIFIER_SHAPE.is_match(&candidate) {
        return None;
    }

    let fields: Vec<&str> = candidate.split(ACTION_IDENTITY_SEPARATOR).collect();
    let [_, identity, reference, signature] = fields.as_slice() else {
        return None;
    };

    Some(ActionIdentifier {
        identity: Pubkey::from_str(identity).ok()?,
        reference: Pubkey::from_str(reference).ok()?,
        signature: Signature::from_str(signature).ok()?,
    })
}

/// Finds the first memo in `memos` that is a valid identifier signed by
/// `identity`.
#[must_use]
pub fn validate_identifier_memos<'a, I>(identity: &Pubkey, memos: I) -> Option<ValidatedIdentifier>
where
    I: IntoIterator<Item = &'a str>,
{
    memos
        .into_iter()
        .filter_map(try_parse_candidate)
        .find(|candidate| candidate.identity == *identity && candidate.verify())
        .map(|candidate| ValidatedIdentifier {
            reference: candidate.reference,
        })
}

/// Validates the RPC `memo` field of a transaction against `identity`.
///
/// The field may hold several `;`-separated memos; the first valid
/// identifier wins.
#[must_use]
pub fn validate_identifier_memo(identity: &Pubkey, memo: Option<&str>) -> Option<ValidatedIdentifier> {
    validate_identifier_memos(identity, memo?.split(MEMO_LIST_SEPARATOR))
}

/// Checks that the transaction behind `info` was tagged by `identity` and is
/// the most recent transaction referencing the tagged reference.
///
/// Any lookup failure counts as not verified.
pub async fn verify_signature_info_for_identity<L: ActionLedger + ?Sized>(
    ledger: &L,
    identity: &Pubkey,
    info: &ConfirmedSignatureInfo,
) -> bool {
    let Some(validated) = validate_identifier_memo(identity, info.memo.as_deref()) else {
        #[cfg(feature = "telemetry")]
        tracing::debug!(signature = %info.signature, "No identifier memo for identity");
        return false;
    };

    match ledger.latest_reference_signature(&validated.reference).await {
        Ok(Some(found)) => found.signature == info.signature,
        Ok(None) => false,
        #[cfg_attr(not(feature = "telemetry"), allow(unused_variables))]
        Err(err) => {
            #[cfg(feature = "telemetry")]
            tracing::debug!(
                reference = %validated.reference,
                error = %err,
                "Reference lookup failed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use solana_actions::constants::MAX_MEMO_BYTES;

    use super::*;
    use crate::ledger::memory::MemoryLedger;

    fn key() -> Pubkey {
        Keypair::new().pubkey()
    }

    fn transfer(from: &Pubkey) -> Instruction {
        Instruction::new_with_bytes(key(), &[2, 0, 0, 0], vec![AccountMeta::new(*from, true)])
    }

    fn memo_ix(text: &str) -> Instruction {
        Instruction::new_with_bytes(MEMO_PROGRAM_PUBKEY, text.as_bytes(), vec![])
    }

    fn info(signature: Signature, memo: Option<String>) -> ConfirmedSignatureInfo {
        ConfirmedSignatureInfo {
            signature,
            slot: 1,
            memo,
        }
    }

    #[test]
    fn test_memo_program_id_matches_constant() {
        assert_eq!(
            MEMO_PROGRAM_PUBKEY.to_string(),
            solana_actions::constants::MEMO_PROGRAM_ID
        );
    }

    #[test]
    fn test_memo_shape() {
        let identity = Keypair::new();
        let reference = key();
        let memo = create_identifier_memo(&identity, &reference).unwrap();

        let fields: Vec<&str> = memo.split(':').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "solana-action");
        assert_eq!(fields[1], identity.pubkey().to_string());
        assert_eq!(fields[2], reference.to_string());

        let signature = Signature::from_str(fields[3]).unwrap();
        assert!(signature.verify(identity.pubkey().as_ref(), reference.as_ref()));
        assert!(memo.len() <= MAX_MEMO_BYTES);
    }

    #[test]
    fn test_memo_roundtrip() {
        let identity = Keypair::new();
        let reference = key();
        let memo = create_identifier_memo(&identity, &reference).unwrap();

        let validated = validate_identifier_memo(&identity.pubkey(), Some(&memo)).unwrap();
        assert_eq!(validated.reference, reference);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let identity = Keypair::new();
        let memo = create_identifier_memo(&identity, &key()).unwrap();

        let (head, signature) = memo.rsplit_once(':').unwrap();
        let mut bytes = bs58::decode(signature).into_vec().unwrap();
        bytes[0] ^= 0x01;
        let tampered = format!("{head}:{}", bs58::encode(bytes).into_string());

        assert_eq!(validate_identifier_memo(&identity.pubkey(), Some(&tampered)), None);
    }

    #[test]
    fn test_other_identity_rejected() {
        let identity = Keypair::new();
        let memo = create_identifier_memo(&identity, &key()).unwrap();
        assert_eq!(validate_identifier_memo(&key(), Some(&memo)), None);
    }

    #[test]
    fn test_three_fields_rejected() {
        let identity = Keypair::new();
        let memo = create_identifier_memo(&identity, &key()).unwrap();
        let (three, _) = memo.rsplit_once(':').unwrap();
        assert_eq!(validate_identifier_memo(&identity.pubkey(), Some(three)), None);
        assert_eq!(try_parse_candidate(three), None);
    }

    #[test]
    fn test_multi_memo_tolerance() {
        let identity = Keypair::new();
        let reference = key();
        let memo = create_identifier_memo(&identity, &reference).unwrap();
        let field = format!("[12] garbage;[{}] {memo}", memo.len());

        let validated = validate_identifier_memo(&identity.pubkey(), Some(&field)).unwrap();
        assert_eq!(validated.reference, reference);
    }

    #[test]
    fn test_first_valid_candidate_wins() {
        let identity = Keypair::new();
        let first = key();
        let second = key();
        let memos = [
            create_identifier_memo(&Keypair::new(), &key()).unwrap(),
            create_identifier_memo(&identity, &first).unwrap(),
            create_identifier_memo(&identity, &second).unwrap(),
        ];
        let validated =
            validate_identifier_memos(&identity.pubkey(), memos.iter().map(String::as_str)).unwrap();
        assert_eq!(validated.reference, first);
    }

    #[test]
    fn test_malformed_candidates() {
        assert_eq!(validate_identifier_memo(&key(), None), None);
        assert_eq!(try_parse_candidate(""), None);
        assert_eq!(try_parse_candidate("hello world"), None);
        assert_eq!(try_parse_candidate("solana-action:a:b:c"), None);
        assert_eq!(try_parse_candidate("solana-action:a:b:c:d"), None);
        assert_eq!(try_parse_candidate("solana-action::::"), None);
    }

    #[test]
    fn test_identifier_instruction_has_no_accounts() {
        let identity = Keypair::new();
        let reference = key();
        let out = create_identifier_instruction(&identity, Some(reference)).unwrap();

        assert_eq!(out.reference, reference);
        assert_eq!(out.instruction.program_id, MEMO_PROGRAM_PUBKEY);
        assert!(out.instruction.accounts.is_empty());
        assert_eq!(out.instruction.data, out.memo.as_bytes());
    }

    #[test]
    fn test_identifier_instruction_generates_reference() {
        let identity = Keypair::new();
        let a = create_identifier_instruction(&identity, None).unwrap();
        let b = create_identifier_instruction(&identity, None).unwrap();
        assert_ne!(a.reference, b.reference);
        assert!(validate_identifier_memo(&identity.pubkey(), Some(&a.memo)).is_some());
    }

    #[test]
    fn test_embed_identity_targets_first_non_memo() {
        let identity = Keypair::new();
        let payer = key();
        let mut instructions = vec![memo_ix("hello"), transfer(&payer), transfer(&payer)];

        let reference = embed_identity(&mut instructions, &identity, None).unwrap();

        assert_eq!(instructions.len(), 4);
        assert!(instructions[0].accounts.is_empty());
        assert_eq!(
            instructions[1].accounts[1..],
            [
                AccountMeta::new_readonly(identity.pubkey(), false),
                AccountMeta::new_readonly(reference, false),
            ]
        );
        assert_eq!(instructions[2].accounts.len(), 1);

        let appended = &instructions[3];
        assert_eq!(appended.program_id, MEMO_PROGRAM_PUBKEY);
        let memo = std::str::from_utf8(&appended.data).unwrap();
        let validated = validate_identifier_memo(&identity.pubkey(), Some(memo)).unwrap();
        assert_eq!(validated.reference, reference);
    }

    #[test]
    fn test_embed_identity_requires_instruction() {
        let mut instructions = Vec::new();
        let err = embed_identity(&mut instructions, &Keypair::new(), None).unwrap_err();
        assert!(matches!(err, IdentityError::InstructionRequired));
        assert_eq!(err.to_string(), "at least 1 instruction required");
    }

    #[test]
    fn test_embed_identity_requires_non_memo() {
        let mut instructions = vec![memo_ix("a"), memo_ix("b")];
        let before = instructions.clone();
        let err = embed_identity(&mut instructions, &Keypair::new(), None).unwrap_err();
        assert!(matches!(err, IdentityError::NonMemoInstructionRequired));
        assert_eq!(
            err.to_string(),
            "transaction requires at least 1 non-memo instruction"
        );
        assert_eq!(instructions, before);
    }

    #[tokio::test]
    async fn test_verify_signature_info_matches_latest() {
        let identity = Keypair::new();
        let reference = key();
        let memo = create_identifier_memo(&identity, &reference).unwrap();
        let signature = Signature::from([7u8; 64]);

        let mut ledger = MemoryLedger::default();
        ledger
            .signatures
            .insert(reference, info(signature, Some(memo.clone())));

        let observed = info(signature, Some(format!("[{}] {memo}", memo.len())));
        assert!(verify_signature_info_for_identity(&ledger, &identity.pubkey(), &observed).await);
    }

    #[tokio::test]
    async fn test_verify_signature_info_rejects_replay() {
        let identity = Keypair::new();
        let reference = key();
        let memo = create_identifier_memo(&identity, &reference).unwrap();

        let mut ledger = MemoryLedger::default();
        ledger
            .signatures
            .insert(reference, info(Signature::from([1u8; 64]), Some(memo.clone())));

        let replayed = info(Signature::from([2u8; 64]), Some(memo));
        assert!(!verify_signature_info_for_identity(&ledger, &identity.pubkey(), &replayed).await);
    }

    #[tokio::test]
    async fn test_verify_signature_info_degrades_to_false() {
        let identity = Keypair::new();
        let memo = create_identifier_memo(&identity, &key()).unwrap();
        let observed = info(Signature::from([3u8; 64]), Some(memo));

        let empty = MemoryLedger::default();
        assert!(!verify_signature_info_for_identity(&empty, &identity.pubkey(), &observed).await);

        let down = MemoryLedger {
            unavailable: true,
            ..MemoryLedger::default()
        };
        assert!(!verify_signature_info_for_identity(&down, &identity.pubkey(), &observed).await);

        let no_memo = info(Signature::from([3u8; 64]), None);
        assert!(!verify_signature_info_for_identity(&empty, &identity.pubkey(), &no_memo).await);
    }
}
