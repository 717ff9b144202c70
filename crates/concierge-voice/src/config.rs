use crate::credential::ToolServerDescriptor;
use concierge_telemetry::SamplerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_voice() -> String {
    "alloy".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_token_ttl_seconds() -> u64 {
    60
}

/// Client-side settings for the voice console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Voice the remote agent speaks with. Default: "alloy".
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default)]
    pub credential_endpoint: CredentialEndpointConfig,
    #[serde(default)]
    pub telemetry: SamplerConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            credential_endpoint: CredentialEndpointConfig::default(),
            telemetry: SamplerConfig::default(),
        }
    }
}

/// Where the console fetches session credentials from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEndpointConfig {
    #[serde(default)]
    pub url: String,
    /// Bearer key sent with each request. Empty means no `Authorization` header.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Request timeout in seconds. Default: 10.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for CredentialEndpointConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for CredentialEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEndpointConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Server-side settings for minting session credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialServiceConfig {
    /// Realtime server URL handed back to clients. Empty disables the service.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// Credential lifetime in seconds. Default: 60.
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    /// Tool servers advertised with every credential.
    #[serde(default)]
    pub tool_servers: Vec<ToolServerDescriptor>,
}

impl Default for CredentialServiceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
            tool_servers: Vec::new(),
        }
    }
}

impl fmt::Debug for CredentialServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialServiceConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("tool_servers", &self.tool_servers)
            .finish()
    }
}

impl CredentialServiceConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }
}
