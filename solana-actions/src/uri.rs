//! Encoding and parsing of Solana Action and blink URLs.
//!
//! An Action URL wraps an `https` link in one of the supported protocol
//! schemes:
//!
//! ```text
//! solana-action:https://example.com/api/action?label=Donate&message=Thanks
//! solana-action:https%3A%2F%2Fexample.com%2Fapi%2Faction%3Famount%3D1
//! ```
//!
//! A link without a query string is embedded raw (minus a trailing `/`);
//! a link with a query string is percent-encoded as a whole so that its own
//! query does not collide with the outer `label`/`message` parameters.
//!
//! A blink is an ordinary web URL carrying a percent-encoded Action URL in its
//! `action` query parameter:
//!
//! ```text
//! https://dial.to/?action=solana-action%3Ahttps%253A%252F%252Fexample.com%252Fapi
//! ```
//!
//! # Example
//!
//! ```rust
//! use solana_actions::uri::{ActionRequestUrl, ActionUrl, SupportedProtocol, encode_url, parse_url};
//!
//! let fields = ActionRequestUrl::new("https://example.com/api/action".parse().unwrap())
//!     .with_label("Donate");
//! let url = encode_url(&fields.clone().into(), SupportedProtocol::default()).unwrap();
//! assert_eq!(url.as_str(), "solana-action:https://example.com/api/action?label=Donate");
//!
//! let ActionUrl::Action(parsed) = parse_url(url.as_str()).unwrap() else {
//!     panic!("expected an action url");
//! };
//! assert_eq!(parsed, fields);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    BLINKS_QUERY_PARAM, HTTPS_PROTOCOL, LABEL_QUERY_PARAM, MAX_URL_LENGTH, MESSAGE_QUERY_PARAM,
};
use crate::error::{EncodeUrlError, ParseUrlError};

/// Characters left untouched by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Protocol schemes accepted in front of a non-blink Action URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedProtocol {
    /// `solana-action:`
    #[default]
    #[serde(rename = "solana-action:")]
    SolanaAction,
    /// `solana-actions:` (plural alias)
    #[serde(rename = "solana-actions:")]
    SolanaActions,
    /// `solana:` (Solana Pay alias)
    #[serde(rename = "solana:")]
    SolanaPay,
}

impl SupportedProtocol {
    /// All supported protocols.
    pub const ALL: [Self; 3] = [Self::SolanaAction, Self::SolanaActions, Self::SolanaPay];

    /// Returns the protocol token, including its trailing colon.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SolanaAction => "solana-action:",
            Self::SolanaActions => "solana-actions:",
            Self::SolanaPay => "solana:",
        }
    }

    /// Returns the bare URL scheme (no trailing colon).
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::SolanaAction => "solana-action",
            Self::SolanaActions => "solana-actions",
            Self::SolanaPay => "solana",
        }
    }

    /// Looks up a protocol by bare URL scheme.
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.scheme() == scheme)
    }
}

impl fmt::Display for SupportedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a Solana Action transaction request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequestUrl {
    /// `https` endpoint implementing the Action API.
    pub link: Url,
    /// Optional label describing the source of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional message describing the nature of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionRequestUrl {
    /// Creates request fields for the given link with no label or message.
    #[must_use]
    pub const fn new(link: Url) -> Self {
        Self {
            link,
            label: None,
            message: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Fields of a blink URL wrapping a Solana Action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkUrl {
    /// Base web URL of the blink.
    pub blink: Url,
    /// Action carried in the blink's `action` query parameter.
    pub action: ActionRequestUrl,
}

/// A parsed Solana Action URL, either bare or wrapped in a blink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionUrl {
    /// `solana-action:<link>` style URL.
    Action(ActionRequestUrl),
    /// `https://…?action=<encoded action url>` style URL.
    Blink(BlinkUrl),
}

impl ActionUrl {
    /// Returns the Action request fields, unwrapping a blink if needed.
    #[must_use]
    pub const fn action(&self) -> &ActionRequestUrl {
        match self {
            Self::Action(action) | Self::Blink(BlinkUrl { action, .. }) => action,
        }
    }

    /// Encodes these fields with the given protocol.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeUrlError`] if the result is not a valid URL.
    pub fn encode(&self, protocol: SupportedProtocol) -> Result<Url, EncodeUrlError> {
        encode_url(self, protocol)
    }
}

impl From<ActionRequestUrl> for ActionUrl {
    fn from(fields: ActionRequestUrl) -> Self {
        Self::Action(fields)
    }
}

impl From<BlinkUrl> for ActionUrl {
    fn from(fields: BlinkUrl) -> Self {
        Self::Blink(fields)
    }
}

impl FromStr for ActionUrl {
    type Err = ParseUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_url(s)
    }
}

impl TryFrom<Url> for ActionUrl {
    type Error = ParseUrlError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        parse_parsed_url(url)
    }
}

/// Encodes Action or blink fields into a URL.
///
/// # Errors
///
/// Returns [`EncodeUrlError`] if the result is not a valid URL.
pub fn encode_url(fields: &ActionUrl, protocol: SupportedProtocol) -> Result<Url, EncodeUrlError> {
    match fields {
        ActionUrl::Action(action) => encode_action_request_url(action, protocol),
        ActionUrl::Blink(blink) => encode_blink_url(blink, protocol),
    }
}

fn encode_action_request_url(
    fields: &ActionRequestUrl,
    protocol: SupportedProtocol,
) -> Result<Url, EncodeUrlError> {
    let link = fields.link.as_str();
    let pathname: Cow<'_, str> = if fields.link.query().is_some_and(|q| !q.is_empty()) {
        let link = link.replacen("/?", "?", 1);
        Cow::Owned(utf8_percent_encode(&link, URI_COMPONENT).to_string())
    } else {
        Cow::Borrowed(link.strip_suffix('/').unwrap_or(link))
    };

    let mut url = Url::parse(&format!("{}{pathname}", protocol.as_str()))?;

    if let Some(label) = fields.label.as_deref().filter(|l| !l.is_empty()) {
        url.query_pairs_mut().append_pair(LABEL_QUERY_PARAM, label);
    }
    if let Some(message) = fields.message.as_deref().filter(|m| !m.is_empty()) {
        url.query_pairs_mut().append_pair(MESSAGE_QUERY_PARAM, message);
    }

    Ok(url)
}

fn encode_blink_url(fields: &BlinkUrl, protocol: SupportedProtocol) -> Result<Url, EncodeUrlError> {
    let action = encode_action_request_url(&fields.action, protocol)?;
    let value = utf8_percent_encode(action.as_str(), URI_COMPONENT).to_string();
    let mut url = fields.blink.clone();
    set_query_param(&mut url, BLINKS_QUERY_PARAM, &value);
    Ok(url)
}

/// Replaces the first `name` pair in place and drops the rest, or appends
/// one if absent.
fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != name {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.to_owned()))
        })
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear().extend_pairs(pairs);
    if !replaced {
        query.append_pair(name, value);
    }
}

/// Parses a Solana Action or blink URL string.
///
/// # Errors
///
/// Returns [`ParseUrlError`] describing the first rule the URL violates.
pub fn parse_url(url: &str) -> Result<ActionUrl, ParseUrlError> {
    let result = if url.len() > MAX_URL_LENGTH {
        Err(ParseUrlError::LengthInvalid)
    } else {
        Url::parse(url)
            .map_err(|_| ParseUrlError::UrlInvalid)
            .and_then(parse_parsed_url)
    };
    #[cfg(feature = "telemetry")]
    if let Err(err) = &result {
        tracing::debug!(reason = err.reason(), "Rejected action url");
    }
    result
}

fn parse_parsed_url(url: Url) -> Result<ActionUrl, ParseUrlError> {
    match url.scheme() {
        "http" | "https" => parse_blink_url(url).map(ActionUrl::Blink),
        _ => parse_action_request_url(&url).map(ActionUrl::Action),
    }
}

fn parse_action_request_url(url: &Url) -> Result<ActionRequestUrl, ParseUrlError> {
    SupportedProtocol::from_scheme(url.scheme()).ok_or(ParseUrlError::ProtocolInvalid)?;

    let pathname = url.path();
    if pathname.is_empty() {
        return Err(ParseUrlError::PathnameMissing);
    }
    // Loose guard: the path must look like an absolute or encoded link.
    if !pathname.contains([':', '%']) {
        return Err(ParseUrlError::PathnameInvalid);
    }

    let decoded = percent_decode_str(pathname)
        .decode_utf8()
        .map_err(|_| ParseUrlError::LinkInvalid)?;
    let link = Url::parse(&decoded).map_err(|_| ParseUrlError::LinkInvalid)?;
    if link.scheme() != HTTPS_PROTOCOL {
        return Err(ParseUrlError::LinkInvalid);
    }

    Ok(ActionRequestUrl {
        link,
        label: query_param(url, LABEL_QUERY_PARAM),
        message: query_param(url, MESSAGE_QUERY_PARAM),
    })
}

fn parse_blink_url(blink: Url) -> Result<BlinkUrl, ParseUrlError> {
    let value =
        query_param(&blink, BLINKS_QUERY_PARAM).ok_or(ParseUrlError::InvalidBlinkUrl)?;

    // `encode_url` escapes the whole action url, scheme separator included.
    let value = if value.contains(':') {
        value
    } else {
        percent_decode_str(&value)
            .decode_utf8()
            .map_err(|_| ParseUrlError::UrlInvalid)?
            .into_owned()
    };

    let inner = Url::parse(&value).map_err(|_| ParseUrlError::UrlInvalid)?;
    let action = parse_action_request_url(&inner)?;
    Ok(BlinkUrl { blink, action })
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn parse_action(s: &str) -> ActionRequestUrl {
        match parse_url(s).unwrap() {
            ActionUrl::Action(action) => action,
            ActionUrl::Blink(_) => panic!("expected an action url"),
        }
    }

    fn parse_blink(s: &str) -> BlinkUrl {
        match parse_url(s).unwrap() {
            ActionUrl::Blink(blink) => blink,
            ActionUrl::Action(_) => panic!("expected a blink url"),
        }
    }

    fn encode_component(s: &str) -> String {
        utf8_percent_encode(s, URI_COMPONENT).to_string()
    }

    #[test]
    fn test_parse_solana_pay_protocol() {
        let action = parse_action("solana:https://example.com/api/action");
        assert_eq!(action.link.as_str(), "https://example.com/api/action");
    }

    #[test]
    fn test_parse_all_protocols() {
        for protocol in SupportedProtocol::ALL {
            let action = parse_action(&format!("{protocol}https://example.com/api/action"));
            assert_eq!(action.link.as_str(), "https://example.com/api/action");
        }
    }

    #[test]
    fn test_parse_encoded_link_with_query() {
        let action = parse_action(
            "solana-action:https%3A%2F%2Fexample.com%2Fapi%2Faction%3Famount%3D1337%26another%3Dyes",
        );
        assert_eq!(
            action.link.as_str(),
            "https://example.com/api/action?amount=1337&another=yes"
        );
        assert_eq!(action.label, None);
        assert_eq!(action.message, None);
    }

    #[test]
    fn test_parse_label_and_message() {
        let action = parse_action(
            "solana-action:https://example.com/api/action?label=Michael&message=Thanks%20for%20all%20the%20fish",
        );
        assert_eq!(action.link.as_str(), "https://example.com/api/action");
        assert_eq!(action.label.as_deref(), Some("Michael"));
        assert_eq!(action.message.as_deref(), Some("Thanks for all the fish"));
    }

    #[test]
    fn test_parse_encoded_link_with_label_and_message() {
        let action = parse_action(
            "solana-action:https%3A%2F%2Fexample.com%2Fapi%2Faction%3Famount%3D1337%26another%3Dyes?label=Michael&message=Thanks%20for%20all%20the%20fish",
        );
        assert_eq!(
            action.link.as_str(),
            "https://example.com/api/action?amount=1337&another=yes"
        );
        assert_eq!(action.label.as_deref(), Some("Michael"));
        assert_eq!(action.message.as_deref(), Some("Thanks for all the fish"));
    }

    #[test]
    fn test_parse_empty_label_is_none() {
        let action = parse_action("solana-action:https://example.com/api/action?label=&message=");
        assert_eq!(action.label, None);
        assert_eq!(action.message, None);
    }

    #[test]
    fn test_parse_blink_without_action_params() {
        let action_link = "https://action.com/api/action";
        let action_url = format!("solana-action:{}", encode_component(action_link));
        let url = format!(
            "https://blink.com/?other=one&action={}",
            encode_component(&action_url)
        );

        let blink = parse_blink(&url);
        assert_eq!(blink.blink.as_str(), url);
        assert_eq!(query_param(&blink.blink, "action").unwrap(), action_url);
        assert_eq!(blink.action.link.as_str(), action_link);
    }

    #[test]
    fn test_parse_blink_with_label_and_message() {
        let action_link = "https://action.com/api/action?query=param";
        let action_url = format!(
            "solana-action:{}?label=Michael&message=Thanks%20for%20all%20the%20fish",
            encode_component(action_link)
        );
        let url = format!(
            "https://blink.com/?other=one&action={}",
            encode_component(&action_url)
        );

        let blink = parse_blink(&url);
        assert_eq!(blink.blink.as_str(), url);
        assert_eq!(blink.action.link.as_str(), action_link);
        assert_eq!(blink.action.label.as_deref(), Some("Michael"));
        assert_eq!(
            blink.action.message.as_deref(),
            Some("Thanks for all the fish")
        );
    }

    #[test]
    fn test_parse_error_length() {
        let url = "X".repeat(2049);
        assert_eq!(parse_url(&url), Err(ParseUrlError::LengthInvalid));
        assert_eq!(ParseUrlError::LengthInvalid.to_string(), "length invalid");
    }

    #[test]
    fn test_parse_error_protocol() {
        assert_eq!(parse_url("eth:0xffff"), Err(ParseUrlError::ProtocolInvalid));
        assert_eq!(
            parse_url("eth:0xffff").unwrap_err().to_string(),
            "protocol invalid"
        );
    }

    #[test]
    fn test_parse_error_pathname_missing() {
        assert_eq!(parse_url("solana-action:"), Err(ParseUrlError::PathnameMissing));
    }

    #[test]
    fn test_parse_error_pathname_invalid() {
        assert_eq!(
            parse_url("solana-action:0xffff"),
            Err(ParseUrlError::PathnameInvalid)
        );
    }

    #[test]
    fn test_parse_error_not_https_link() {
        assert_eq!(
            parse_url("solana-action:http://example.com/api/action"),
            Err(ParseUrlError::LinkInvalid)
        );
    }

    #[test]
    fn test_parse_error_not_a_url() {
        assert_eq!(parse_url("not a url"), Err(ParseUrlError::UrlInvalid));
    }

    #[test]
    fn test_parse_error_empty_blink_action() {
        assert_eq!(
            parse_url("https://blink.com/?other=one&action="),
            Err(ParseUrlError::InvalidBlinkUrl)
        );
        assert_eq!(
            parse_url("https://blink.com/?other=one"),
            Err(ParseUrlError::InvalidBlinkUrl)
        );
    }

    #[test]
    fn test_parse_error_blink_action_protocol() {
        let url = "https://blink.com/?other=one&action=unknown-protocol%3Ahttps%253A%252F%252Faction.com%252Fapi%252Faction%253Fquery%253Dparam";
        assert_eq!(parse_url(url), Err(ParseUrlError::ProtocolInvalid));
    }

    #[test]
    fn test_parse_error_blink_action_link() {
        let url = "https://blink.com/?other=one&action=solana-action%3Aftp%253A%252F%252Faction.com%252Fapi%252Faction%253Fquery%253Dparam";
        assert_eq!(parse_url(url), Err(ParseUrlError::LinkInvalid));
    }

    #[test]
    fn test_encode_strips_trailing_slash() {
        let fields = ActionRequestUrl::new(link("https://example.com/api/action/"));
        let url = encode_url(&fields.into(), SupportedProtocol::SolanaAction).unwrap();
        assert_eq!(url.as_str(), "solana-action:https://example.com/api/action");
    }

    #[test]
    fn test_encode_link_with_query_is_escaped() {
        let fields = ActionRequestUrl::new(link("https://example.com/api/action?amount=1337"))
            .with_label("Michael")
            .with_message("Thanks for all the fish");
        let url = encode_url(&fields.into(), SupportedProtocol::SolanaAction).unwrap();
        assert_eq!(
            url.as_str(),
            "solana-action:https%3A%2F%2Fexample.com%2Fapi%2Faction%3Famount%3D1337?label=Michael&message=Thanks+for+all+the+fish"
        );
    }

    #[test]
    fn test_encode_uses_requested_protocol() {
        let fields = ActionRequestUrl::new(link("https://example.com/api/action"));
        let url = encode_url(&fields.into(), SupportedProtocol::SolanaPay).unwrap();
        assert_eq!(url.as_str(), "solana:https://example.com/api/action");
    }

    #[test]
    fn test_encode_skips_empty_label() {
        let fields = ActionRequestUrl::new(link("https://example.com/api/action")).with_label("");
        let url = encode_url(&fields.into(), SupportedProtocol::SolanaAction).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_encode_blink_sets_action_param_once() {
        let fields = BlinkUrl {
            blink: link("https://blink.com/?action=old&other=one&action=older"),
            action: ActionRequestUrl::new(link("https://action.com/api/action")),
        };
        let url = encode_url(&fields.into(), SupportedProtocol::SolanaAction).unwrap();
        let actions: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k == "action")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(
            actions,
            vec![encode_component("solana-action:https://action.com/api/action")]
        );
        assert_eq!(
            url.query_pairs().next().map(|(k, _)| k.into_owned()).as_deref(),
            Some("action")
        );
        assert_eq!(query_param(&url, "other").as_deref(), Some("one"));
    }

    #[test]
    fn test_roundtrip_action_url() {
        let cases = [
            ActionRequestUrl::new(link("https://example.com/api/action")),
            ActionRequestUrl::new(link("https://example.com/api/action?amount=1&to=abc"))
                .with_label("Donate"),
            ActionRequestUrl::new(link("https://example.com/"))
                .with_label("A label & more")
                .with_message("Thanks for all the fish!"),
            ActionRequestUrl::new(link("https://example.com/?ref=blink")).with_message("hi"),
        ];
        for fields in cases {
            for protocol in SupportedProtocol::ALL {
                let url = encode_url(&fields.clone().into(), protocol).unwrap();
                assert_eq!(parse_action(url.as_str()), fields, "{url}");
            }
        }
    }

    #[test]
    fn test_roundtrip_blink_url() {
        let action = ActionRequestUrl::new(link("https://action.com/api/action?query=param"))
            .with_label("Michael")
            .with_message("Thanks for all the fish");
        let fields = BlinkUrl {
            blink: link("https://blink.com/?other=one"),
            action: action.clone(),
        };

        let url = encode_url(&fields.into(), SupportedProtocol::SolanaAction).unwrap();
        let parsed = parse_blink(url.as_str());

        assert_eq!(parsed.action, action);
        let inner = encode_action_request_url(&action, SupportedProtocol::SolanaAction).unwrap();
        assert_eq!(
            query_param(&parsed.blink, "action").unwrap(),
            encode_component(inner.as_str())
        );
        assert_eq!(query_param(&parsed.blink, "other").as_deref(), Some("one"));
    }

    #[test]
    fn test_action_url_from_str_and_try_from() {
        let from_str: ActionUrl = "solana-action:https://example.com/api".parse().unwrap();
        let try_from =
            ActionUrl::try_from(link("solana-action:https://example.com/api")).unwrap();
        assert_eq!(from_str, try_from);
        assert_eq!(from_str.action().link.as_str(), "https://example.com/api");
    }

    #[test]
    fn test_supported_protocol_serde() {
        let json = serde_json::to_string(&SupportedProtocol::SolanaActions).unwrap();
        assert_eq!(json, "\"solana-actions:\"");
        let protocol: SupportedProtocol = serde_json::from_str("\"solana:\"").unwrap();
        assert_eq!(protocol, SupportedProtocol::SolanaPay);
        assert_eq!(SupportedProtocol::from_scheme("solana-action"), Some(SupportedProtocol::SolanaAction));
        assert_eq!(SupportedProtocol::from_scheme("https"), None);
    }
}
