//! Wire types of the Solana Actions API.
//!
//! All types serialize with `camelCase` field names, matching the JSON
//! exchanged between Action servers and blink clients.

use serde::{Deserialize, Serialize};

/// Contents of an origin's `/actions.json` discovery file.
///
/// # JSON Format
///
/// ```json
/// {
///   "rules": [
///     { "pathPattern": "/*", "apiPath": "/api/actions/*" },
///     { "pathPattern": "/api/actions/**", "apiPath": "/api/actions/**" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsJson {
    /// URL mapping rules, matched in order.
    pub rules: Vec<ActionRuleObject>,
}

/// Maps a website path pattern to the Action API path serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRuleObject {
    /// Relative (or absolute) path pattern on the origin, e.g. `/buy/*`.
    pub path_pattern: String,
    /// Action API path the pattern resolves to, e.g. `/api/buy/*`.
    pub api_path: String,
}

impl ActionRuleObject {
    /// Creates a rule.
    #[must_use]
    pub fn new(path_pattern: impl Into<String>, api_path: impl Into<String>) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            api_path: api_path.into(),
        }
    }
}

/// Kind of Action metadata returned from a GET request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    /// An interactive Action.
    #[default]
    Action,
    /// A terminal state in an Action chain; rendered without buttons.
    Completed,
}

/// Kind of request a linked action triggers when executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkedActionType {
    /// POST returns a transaction to sign.
    #[default]
    Transaction,
    /// POST returns a message to sign.
    Message,
    /// POST performs a side effect with no signature.
    Post,
    /// Navigates to an external link.
    ExternalLink,
}

/// Metadata returned by `GET` on an Action endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGetResponse {
    /// Action type; defaults to `action` when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,

    /// Absolute image URL (SVG, PNG or WebP).
    pub icon: String,

    /// Title of the source of the Action.
    pub title: String,

    /// Short description of the Action.
    pub description: String,

    /// Button text, at most 5 words, starting with a verb.
    pub label: String,

    /// Whether the Action is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    /// Related Actions rendered in place of the single `label` button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ActionLinks>,

    /// Non-fatal error shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

/// Container for [`LinkedAction`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLinks {
    /// Linked actions in display order.
    pub actions: Vec<LinkedAction>,
}

/// A related Action offered by the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAction {
    /// What the action does when executed.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<LinkedActionType>,

    /// URL of the endpoint, possibly templated with `{parameter}` names.
    pub href: String,

    /// Button text.
    pub label: String,

    /// User inputs collected before executing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ActionParameter>>,
}

impl LinkedAction {
    /// Creates a linked action without parameters.
    #[must_use]
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action_type: None,
            href: href.into(),
            label: label.into(),
            parameters: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ActionParameter) -> Self {
        self.parameters.get_or_insert_with(Vec::new).push(parameter);
        self
    }
}

/// Input element type of an [`ActionParameter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionParameterType {
    /// Free text input.
    #[default]
    Text,
    /// Email address.
    Email,
    /// URL.
    Url,
    /// Number.
    Number,
    /// Date.
    Date,
    /// Local date and time.
    DatetimeLocal,
    /// Multi-line text.
    Textarea,
    /// Dropdown; requires `options`.
    Select,
    /// Radio group; requires `options`.
    Radio,
    /// Checkbox group; requires `options`.
    Checkbox,
}

impl ActionParameterType {
    /// Returns `true` for types that choose from a list of `options`.
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

/// A user input collected by a [`LinkedAction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameter {
    /// Input type; `text` when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<ActionParameterType>,

    /// Name substituted into the `href` template.
    pub name: String,

    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Whether a value must be provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Human-readable description of `pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_description: Option<String>,

    /// Lower bound: a number for numeric inputs, a date string for dates,
    /// a minimum length for text or selection count for checkboxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,

    /// Upper bound, same interpretation as `min`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,

    /// Choices for selectable types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ActionParameterOption>>,
}

impl ActionParameter {
    /// Creates a parameter with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parameter_type: None,
            name: name.into(),
            label: None,
            required: None,
            pattern: None,
            pattern_description: None,
            min: None,
            max: None,
            options: None,
        }
    }

    /// Sets the placeholder label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the input type.
    #[must_use]
    pub fn with_type(mut self, parameter_type: ActionParameterType) -> Self {
        self.parameter_type = Some(parameter_type);
        self
    }

    /// Sets the `min`/`max` bounds.
    #[must_use]
    pub fn with_bounds(
        mut self,
        min: impl Into<serde_json::Value>,
        max: impl Into<serde_json::Value>,
    ) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }
}

/// One choice of a selectable [`ActionParameter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameterOption {
    /// Displayed text.
    pub label: String,
    /// Submitted value.
    pub value: String,
    /// Whether the option is preselected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

/// Body of a `POST` to an Action endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPostRequest {
    /// Base58 public key of the account that may sign the transaction.
    pub account: String,
}

/// Response to a `POST` on an Action endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPostResponse {
    /// Response kind; `transaction` when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<LinkedActionType>,

    /// Base64-encoded serialized transaction.
    pub transaction: String,

    /// Human-readable description of the transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Follow-up Action in a chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PostResponseLinks>,
}

/// Links attached to an [`ActionPostResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponseLinks {
    /// Where to go after the transaction confirms.
    pub next: NextActionLink,
}

/// Pointer to the next Action in a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NextActionLink {
    /// The client POSTs `{ account, signature }` to `href` to get the next Action.
    Post {
        /// Same-origin callback URL.
        href: String,
    },
    /// The next Action is embedded directly.
    Inline {
        /// Metadata of the next Action.
        action: Box<ActionGetResponse>,
    },
}

/// Body of the callback POST for a [`NextActionLink::Post`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextActionPostRequest {
    /// Base58 account that signed.
    pub account: String,
    /// Base58 signature of the confirmed transaction.
    pub signature: String,
}

/// Error body returned by Action endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    /// Human-readable message.
    pub message: String,
}

impl ActionError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Structured data a wallet is asked to sign as a message.
///
/// See [`crate::sign_message`] for the text representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageData {
    /// Requesting domain.
    pub domain: String,
    /// Base58 address of the signer.
    pub address: String,
    /// Human-readable statement.
    pub statement: String,
    /// Server-generated nonce.
    pub nonce: String,
    /// RFC 3339 timestamp of issue.
    pub issued_at: String,
    /// Optional CAIP-2 chain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}
