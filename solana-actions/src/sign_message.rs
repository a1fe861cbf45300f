//! Human-readable sign-message text for Actions that request a message
//! signature instead of a transaction.
//!
//! The text format is:
//!
//! ```text
//! {domain} wants you to sign a message with your account:
//! {address}
//!
//! {statement}
//!
//! Chain ID: {chainId}
//! Nonce: {nonce}
//! Issued At: {issuedAt}
//! ```
//!
//! where the `Chain ID` line is present only when a chain id is set.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::spec::SignMessageData;

static MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?<domain>[^\n]+?) wants you to sign a message with your account:\n",
        r"(?<address>[^\n]+)(?:\n|$)",
        r"(?:\n(?<statement>[\S\s]*?)(?:\n|$))",
        r"(?:\nChain ID: (?<chainId>[^\n]+))?",
        r"\nNonce: (?<nonce>[^\n]+)",
        r"\nIssued At: (?<issuedAt>[^\n]+)",
        r"\n*$",
    ))
    .expect("Invalid sign message pattern")
});

/// Reason a [`SignMessageData`] failed verification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignMessageVerificationError {
    /// `address` differs from the expected signer.
    #[error("address mismatch")]
    AddressMismatch,
    /// `domain` is not one of the expected domains.
    #[error("domain mismatch")]
    DomainMismatch,
    /// `chainId` is not one of the expected chain ids.
    #[error("chain id mismatch")]
    ChainIdMismatch,
    /// `issuedAt` is older than the allowed threshold.
    #[error("issued too far in the past")]
    IssuedTooFarInThePast,
    /// `issuedAt` is further ahead than the allowed threshold.
    #[error("issued too far in the future")]
    IssuedTooFarInTheFuture,
    /// A required field is empty or `issuedAt` is not RFC 3339.
    #[error("invalid data")]
    InvalidData,
}

/// Expectations checked by [`verify_sign_message_data`]. Unset fields are
/// not checked.
#[derive(Debug, Clone, Default)]
pub struct SignMessageVerificationOptions {
    /// Address the message must be addressed to.
    pub expected_address: Option<String>,
    /// Accepted domains; a leading `www.` is ignored on both sides.
    pub expected_domains: Option<Vec<String>>,
    /// Accepted chain ids, checked only when the data carries one.
    pub expected_chain_ids: Option<Vec<String>>,
    /// Maximum distance between `issuedAt` and now.
    pub issued_at_threshold: Option<TimeDelta>,
}

/// Renders the text a wallet shows and signs for `data`.
#[must_use]
pub fn create_sign_message_text(data: &SignMessageData) -> String {
    let mut fields = Vec::with_capacity(3);
    if let Some(chain_id) = data.chain_id.as_deref().filter(|c| !c.is_empty()) {
        fields.push(format!("Chain ID: {chain_id}"));
    }
    fields.push(format!("Nonce: {}", data.nonce));
    fields.push(format!("Issued At: {}", data.issued_at));

    format!(
        "{} wants you to sign a message with your account:\n{}\n\n{}\n\n{}",
        data.domain,
        data.address,
        data.statement,
        fields.join("\n")
    )
}

/// Parses text produced by [`create_sign_message_text`].
///
/// Returns `None` if the text does not follow the format.
#[must_use]
pub fn parse_sign_message_text(text: &str) -> Option<SignMessageData> {
    let captures = MESSAGE.captures(text)?;
    let group = |name: &str| {
        captures
            .name(name)
            .map_or_else(String::new, |m| m.as_str().to_owned())
    };

    Some(SignMessageData {
        domain: group("domain"),
        address: group("address"),
        statement: group("statement"),
        nonce: group("nonce"),
        issued_at: group("issuedAt"),
        chain_id: captures.name("chainId").map(|m| m.as_str().to_owned()),
    })
}

/// Verifies `data` against `options` at the current time.
///
/// Returns every failed check; an empty list means the data is acceptable.
#[must_use]
pub fn verify_sign_message_data(
    data: &SignMessageData,
    options: &SignMessageVerificationOptions,
) -> Vec<SignMessageVerificationError> {
    verify_sign_message_data_at(data, options, Utc::now())
}

/// Verifies `data` against `options` as of `now`.
#[must_use]
pub fn verify_sign_message_data_at(
    data: &SignMessageData,
    options: &SignMessageVerificationOptions,
    now: DateTime<Utc>,
) -> Vec<SignMessageVerificationError> {
    let required = [
        &data.address,
        &data.domain,
        &data.issued_at,
        &data.nonce,
        &data.statement,
    ];
    if required.iter().any(|field| field.is_empty()) {
        return vec![SignMessageVerificationError::InvalidData];
    }

    let mut errors = Vec::new();

    if let Some(expected) = &options.expected_address
        && data.address != *expected
    {
        errors.push(SignMessageVerificationError::AddressMismatch);
    }

    if let Some(expected) = &options.expected_domains {
        let domain = normalize_domain(&data.domain);
        if !expected.iter().any(|d| normalize_domain(d) == domain) {
            errors.push(SignMessageVerificationError::DomainMismatch);
        }
    }

    if let Some(expected) = &options.expected_chain_ids
        && let Some(chain_id) = data.chain_id.as_deref().filter(|c| !c.is_empty())
        && !expected.iter().any(|c| c == chain_id)
    {
        errors.push(SignMessageVerificationError::ChainIdMismatch);
    }

    if let Some(threshold) = options.issued_at_threshold {
        let Ok(issued_at) = DateTime::parse_from_rfc3339(&data.issued_at) else {
            return vec![SignMessageVerificationError::InvalidData];
        };
        let drift = issued_at.with_timezone(&Utc) - now;
        if drift.abs() > threshold {
            errors.push(if drift < TimeDelta::zero() {
                SignMessageVerificationError::IssuedTooFarInThePast
            } else {
                SignMessageVerificationError::IssuedTooFarInTheFuture
            });
        }
    }

    errors
}

fn normalize_domain(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> SignMessageData {
        SignMessageData {
            domain: "example.com".into(),
            address: "7nxQB5k3Vkx8pvPyD4Z5Ftp6vGaVp9ZQQ5DcBGqP6Jsb".into(),
            statement: "Sign in to Example".into(),
            nonce: "42".into(),
            issued_at: "2024-05-01T12:00:00Z".into(),
            chain_id: None,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_create_text_without_chain_id() {
        assert_eq!(
            create_sign_message_text(&data()),
            "example.com wants you to sign a message with your account:\n\
             7nxQB5k3Vkx8pvPyD4Z5Ftp6vGaVp9ZQQ5DcBGqP6Jsb\n\n\
             Sign in to Example\n\n\
             Nonce: 42\n\
             Issued At: 2024-05-01T12:00:00Z"
        );
    }

    #[test]
    fn test_create_text_with_chain_id() {
        let mut data = data();
        data.chain_id = Some("solana:devnet".into());
        let text = create_sign_message_text(&data);
        assert!(text.ends_with("\n\nChain ID: solana:devnet\nNonce: 42\nIssued At: 2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_parse_text_roundtrip() {
        let mut with_chain = data();
        with_chain.chain_id = Some("solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp".into());
        let mut multiline = data();
        multiline.statement = "line one\nline two".into();

        for data in [data(), with_chain, multiline] {
            let text = create_sign_message_text(&data);
            assert_eq!(parse_sign_message_text(&text), Some(data));
        }
    }

    #[test]
    fn test_parse_text_rejects_garbage() {
        assert_eq!(parse_sign_message_text("hello world"), None);
        assert_eq!(
            parse_sign_message_text(
                "example.com wants you to sign a message with your account:\nabc\n\nhi\n\nIssued At: now"
            ),
            None
        );
    }

    #[test]
    fn test_verify_accepts_matching_data() {
        let options = SignMessageVerificationOptions {
            expected_address: Some(data().address),
            expected_domains: Some(vec!["www.example.com".into()]),
            expected_chain_ids: Some(vec!["solana:mainnet".into()]),
            issued_at_threshold: Some(TimeDelta::minutes(5)),
        };
        let errors = verify_sign_message_data_at(&data(), &options, at("2024-05-01T12:01:00Z"));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_verify_reports_all_mismatches() {
        let mut data = data();
        data.chain_id = Some("solana:devnet".into());
        let options = SignMessageVerificationOptions {
            expected_address: Some("other".into()),
            expected_domains: Some(vec!["another.com".into()]),
            expected_chain_ids: Some(vec!["solana:mainnet".into()]),
            issued_at_threshold: Some(TimeDelta::minutes(5)),
        };
        let errors = verify_sign_message_data_at(&data, &options, at("2024-05-01T13:00:00Z"));
        assert_eq!(
            errors,
            vec![
                SignMessageVerificationError::AddressMismatch,
                SignMessageVerificationError::DomainMismatch,
                SignMessageVerificationError::ChainIdMismatch,
                SignMessageVerificationError::IssuedTooFarInThePast,
            ]
        );
    }

    #[test]
    fn test_verify_issued_in_future() {
        let options = SignMessageVerificationOptions {
            issued_at_threshold: Some(TimeDelta::seconds(30)),
            ..Default::default()
        };
        let errors = verify_sign_message_data_at(&data(), &options, at("2024-05-01T11:00:00Z"));
        assert_eq!(errors, vec![SignMessageVerificationError::IssuedTooFarInTheFuture]);
    }

    #[test]
    fn test_verify_invalid_data() {
        let mut no_nonce = data();
        no_nonce.nonce.clear();
        let errors =
            verify_sign_message_data(&no_nonce, &SignMessageVerificationOptions::default());
        assert_eq!(errors, vec![SignMessageVerificationError::InvalidData]);

        let mut bad_date = data();
        bad_date.issued_at = "yesterday".into();
        let options = SignMessageVerificationOptions {
            issued_at_threshold: Some(TimeDelta::seconds(30)),
            ..Default::default()
        };
        assert_eq!(
            verify_sign_message_data(&bad_date, &options),
            vec![SignMessageVerificationError::InvalidData]
        );
    }

    #[test]
    fn test_verification_error_codes() {
        assert_eq!(
            serde_json::to_value(SignMessageVerificationError::IssuedTooFarInThePast).unwrap(),
            serde_json::json!("ISSUED_TOO_FAR_IN_THE_PAST")
        );
    }
}
