//! Short-lived session credentials.
//!
//! The console asks a [`CredentialProvider`] for a credential at the start of
//! every connection attempt. [`HttpCredentialClient`] is the production
//! provider; it posts to the credential endpoint served by
//! `concierge-server`.

use crate::config::CredentialEndpointConfig;
use crate::error::VoiceError;
use async_trait::async_trait;
use concierge_types::QualityPreset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Body of a credential request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub session_id: Uuid,
    pub quality: QualityPreset,
    pub voice: String,
}

/// A tool server the remote agent may be granted access to.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolServerDescriptor {
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

impl fmt::Debug for ToolServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolServerDescriptor")
            .field("label", &self.label)
            .field("url", &self.url)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// A successfully issued credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialGrant {
    pub credential: String,
    pub expires_in_seconds: u64,
    /// Realtime server the credential is valid for, when the issuer names one.
    #[serde(default, rename = "url", skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default)]
    pub tool_servers: Vec<ToolServerDescriptor>,
}

impl fmt::Debug for CredentialGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGrant")
            .field("credential", &"[REDACTED]")
            .field("expires_in_seconds", &self.expires_in_seconds)
            .field("server_url", &self.server_url)
            .field("tool_servers", &self.tool_servers)
            .finish()
    }
}

/// Wire shape of the endpoint's response, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialResponse {
    #[serde(default)]
    credential: Option<String>,
    #[serde(default)]
    expires_in_seconds: Option<u64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tool_servers: Vec<ToolServerDescriptor>,
}

impl CredentialResponse {
    fn into_grant(self) -> Result<CredentialGrant, VoiceError> {
        let credential = self
            .credential
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                VoiceError::Credential("response is missing the credential field".to_string())
            })?;

        Ok(CredentialGrant {
            credential,
            expires_in_seconds: self.expires_in_seconds.unwrap_or(0),
            server_url: self.url.filter(|u| !u.is_empty()),
            tool_servers: self.tool_servers,
        })
    }
}

/// Issues short-lived session credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn request_credential(
        &self,
        request: &CredentialRequest,
    ) -> Result<CredentialGrant, VoiceError>;
}

/// [`CredentialProvider`] that calls the HTTP credential endpoint.
#[derive(Clone)]
pub struct HttpCredentialClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl fmt::Debug for HttpCredentialClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCredentialClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpCredentialClient {
    /// Builds a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` if the endpoint URL is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &CredentialEndpointConfig) -> Result<Self, VoiceError> {
        if config.url.trim().is_empty() {
            return Err(VoiceError::Config(
                "credential endpoint URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CredentialProvider for HttpCredentialClient {
    async fn request_credential(
        &self,
        request: &CredentialRequest,
    ) -> Result<CredentialGrant, VoiceError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            VoiceError::Credential(format!("credential endpoint unreachable: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Credential(format!(
                "credential endpoint returned {}: {}",
                status, body
            )));
        }

        let body: CredentialResponse = response.json().await.map_err(|e| {
            VoiceError::Credential(format!("malformed credential response: {}", e))
        })?;

        let grant = body.into_grant()?;
        tracing::debug!(
            session_id = %request.session_id,
            expires_in_seconds = grant.expires_in_seconds,
            tool_servers = grant.tool_servers.len(),
            "received session credential"
        );
        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_without_credential_is_rejected() {
        let response: CredentialResponse =
            serde_json::from_str(r#"{"expiresInSeconds": 60}"#).unwrap();
        assert!(matches!(
            response.into_grant(),
            Err(VoiceError::Credential(_))
        ));

        let blank: CredentialResponse =
            serde_json::from_str(r#"{"credential": "  "}"#).unwrap();
        assert!(blank.into_grant().is_err());
    }

    #[test]
    fn tool_server_accepts_name_alias() {
        let response: CredentialResponse = serde_json::from_str(
            r#"{
                "credential": "tok",
                "toolServers": [
                    {"name": "support", "url": "https://tools.example.com/mcp"},
                    {"label": "lights", "url": "https://lights.example.com/mcp", "authorization": "Bearer x"}
                ]
            }"#,
        )
        .unwrap();

        let grant = response.into_grant().unwrap();
        assert_eq!(grant.tool_servers.len(), 2);
        assert_eq!(grant.tool_servers[0].label.as_deref(), Some("support"));
        assert_eq!(grant.tool_servers[1].authorization.as_deref(), Some("Bearer x"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let grant = CredentialGrant {
            credential: "secret-token".to_string(),
            expires_in_seconds: 60,
            server_url: None,
            tool_servers: vec![ToolServerDescriptor {
                label: Some("support".to_string()),
                url: Some("https://tools.example.com".to_string()),
                authorization: Some("Bearer hunter2".to_string()),
            }],
        };
        let debug = format!("{:?}", grant);
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn empty_endpoint_is_a_config_error() {
        let config = CredentialEndpointConfig::default();
        assert!(matches!(
            HttpCredentialClient::new(&config),
            Err(VoiceError::Config(_))
        ));
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = CredentialRequest {
            session_id: Uuid::nil(),
            quality: QualityPreset::LowBandwidth,
            voice: "alloy".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sessionId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["quality"], "low-bandwidth");
        assert_eq!(json["voice"], "alloy");
    }
}
