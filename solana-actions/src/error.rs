//! Error types for the Solana Actions URL codec.

/// A URL could not be parsed as a Solana Action or blink URL.
///
/// The [`Display`](std::fmt::Display) output of every variant is a short,
/// machine-readable reason string (e.g. `protocol invalid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseUrlError {
    /// The URL string exceeds [`MAX_URL_LENGTH`](crate::constants::MAX_URL_LENGTH).
    #[error("length invalid")]
    LengthInvalid,
    /// The input string is not a URL at all.
    #[error("url invalid")]
    UrlInvalid,
    /// The scheme is neither `http(s)` nor a supported Action protocol.
    #[error("protocol invalid")]
    ProtocolInvalid,
    /// The Action URL has no pathname.
    #[error("pathname missing")]
    PathnameMissing,
    /// The pathname does not look like an absolute or encoded link.
    #[error("pathname invalid")]
    PathnameInvalid,
    /// The embedded link is not a valid `https` URL.
    #[error("link invalid")]
    LinkInvalid,
    /// A blink URL is missing its `action` query parameter.
    #[error("invalid blink url")]
    InvalidBlinkUrl,
}

impl ParseUrlError {
    /// Returns the machine-readable reason for this error.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::LengthInvalid => "length invalid",
            Self::UrlInvalid => "url invalid",
            Self::ProtocolInvalid => "protocol invalid",
            Self::PathnameMissing => "pathname missing",
            Self::PathnameInvalid => "pathname invalid",
            Self::LinkInvalid => "link invalid",
            Self::InvalidBlinkUrl => "invalid blink url",
        }
    }
}

/// Fields could not be encoded as a Solana Action or blink URL.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Can not encode action url: {0}")]
pub struct EncodeUrlError(#[from] pub url::ParseError);
