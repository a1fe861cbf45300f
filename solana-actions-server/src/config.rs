//! Server configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! base_url = "https://actions.example.com"
//! rpc_url = "https://api.devnet.solana.com"
//! chain_id = "devnet"
//! action_identity_secret = "$ACTION_IDENTITY_SECRET"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `config.toml`)
//! - `HOST` - Override server bind address
//! - `PORT` - Override server port
//! - `ACTION_IDENTITY_SECRET` - Identity keypair, used when the file sets none

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use solana_keypair::Keypair;
use url::Url;

/// Environment variable holding the action identity keypair.
pub const ACTION_IDENTITY_SECRET_VAR: &str = "ACTION_IDENTITY_SECRET";

/// Top-level server configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `8080`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public origin of the server, used for absolute links.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// HTTP RPC endpoint URL.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Cluster alias (`mainnet`, `devnet`, `testnet`) or CAIP-2 identifier.
    #[serde(default = "default_chain_id")]
    pub chain_id: String,

    /// Action spec version announced in `X-Action-Version`.
    #[serde(default = "default_action_version")]
    pub action_version: String,

    /// Icon of the memo Action; `<base_url>/solana_devs.jpg` when unset.
    #[serde(default)]
    pub icon: Option<String>,

    /// Compute unit limit of the memo transaction.
    #[serde(default = "default_compute_unit_limit")]
    pub compute_unit_limit: u32,

    /// Identity keypair as a JSON byte array, the format of a Solana
    /// keypair file. Supports `$VAR` / `${VAR}`.
    #[serde(default)]
    pub action_identity_secret: Option<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
}

const fn default_port() -> u16 {
    8080
}

fn default_base_url() -> Url {
    Url::parse("http://localhost:8080").expect("Invalid default base URL")
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_owned()
}

fn default_chain_id() -> String {
    "devnet".to_owned()
}

fn default_action_version() -> String {
    "2.4".to_owned()
}

const fn default_compute_unit_limit() -> u32 {
    50_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            action_version: default_action_version(),
            icon: None,
            compute_unit_limit: default_compute_unit_limit(),
            action_identity_secret: None,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url.as_str())
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("action_version", &self.action_version)
            .field("icon", &self.icon)
            .field("compute_unit_limit", &self.compute_unit_limit)
            .field(
                "has_action_identity_secret",
                &self.action_identity_secret.is_some(),
            )
            .finish()
    }
}

impl ServerConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// After loading, all string values with `$VAR` / `${VAR}` references
    /// are expanded from the process environment. `HOST` and `PORT` env vars
    /// override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };

        let mut config = Self::parse(&content)?;

        if let Ok(host) = std::env::var("HOST")
            && let Ok(addr) = host.parse()
        {
            config.host = addr;
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }
        if config.action_identity_secret.is_none() {
            config.action_identity_secret = std::env::var(ACTION_IDENTITY_SECRET_VAR).ok();
        }

        Ok(config)
    }

    /// Parses configuration from TOML text, expanding environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the expanded text is not a valid configuration.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(&expand_env_vars(content))
    }

    /// Decodes the action identity keypair.
    ///
    /// Returns `Ok(None)` when no secret is configured or its variable did
    /// not resolve.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is not a JSON byte array holding a
    /// valid keypair.
    pub fn action_identity(&self) -> Result<Option<Keypair>, Box<dyn std::error::Error>> {
        let Some(secret) = self
            .action_identity_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty() && !secret.starts_with('$'))
        else {
            return Ok(None);
        };

        let bytes: Vec<u8> = serde_json::from_str(secret)
            .map_err(|e| format!("Invalid action identity secret: {e}"))?;
        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| format!("Invalid action identity keypair: {e}"))?;
        Ok(Some(keypair))
    }

    /// Returns the icon URL of the memo Action.
    #[must_use]
    pub fn icon_url(&self) -> String {
        self.icon.clone().unwrap_or_else(|| {
            self.base_url
                .join("/solana_devs.jpg")
                .map_or_else(|_| "/solana_devs.jpg".to_owned(), String::from)
        })
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        if !var_name.is_empty()
            && let Ok(val) = std::env::var(&var_name)
        {
            result.push_str(&val);
        } else {
            result.push('$');
            if braced {
                result.push('{');
            }
            result.push_str(&var_name);
            if braced && !var_name.is_empty() {
                result.push('}');
            }
        }
    }

    result
}
