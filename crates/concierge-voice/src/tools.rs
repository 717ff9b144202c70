//! Tool-server configuration sent to the remote agent.

use crate::credential::ToolServerDescriptor;
use crate::error::VoiceError;
use concierge_types::{McpExposureMode, SessionSettings};
use serde::{Deserialize, Serialize};

/// Tool servers never prompt the guest for approval mid-conversation.
pub const REQUIRE_APPROVAL_NEVER: &str = "never";

/// A `session.update` message configuring the agent's tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    pub session: SessionToolConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToolConfig {
    pub tools: Vec<McpToolConfig>,
}

/// One tool server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpToolConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub server_label: String,
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    /// `None` exposes every tool. `Some(vec![])` exposes none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    pub require_approval: String,
}

/// Label used for a descriptor that does not carry one.
pub fn fallback_label(index: usize) -> String {
    format!("server-{}", index + 1)
}

/// Builds the `session.update` for the granted tool servers.
///
/// Returns `Ok(None)` when there are no tool servers. In manual exposure
/// mode each server's allow-list is exactly the tools selected for its
/// label, which may be empty.
///
/// # Errors
///
/// Returns `VoiceError::ToolConfiguration` if a descriptor has no URL.
pub fn build_session_update(
    servers: &[ToolServerDescriptor],
    settings: &SessionSettings,
) -> Result<Option<SessionUpdate>, VoiceError> {
    if servers.is_empty() {
        return Ok(None);
    }

    let mut tools = Vec::with_capacity(servers.len());
    for (index, server) in servers.iter().enumerate() {
        let label = server
            .label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_label(index));

        let url = server
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                VoiceError::ToolConfiguration(format!("tool server '{}' has no URL", label))
            })?;

        let allowed_tools = match settings.mcp_exposure_mode {
            McpExposureMode::All => None,
            McpExposureMode::Manual => Some(settings.selected_tools_for(&label)),
        };

        tools.push(McpToolConfig {
            kind: "mcp".to_string(),
            server_label: label,
            server_url: url.to_string(),
            authorization: server.authorization.clone().filter(|a| !a.is_empty()),
            allowed_tools,
            require_approval: REQUIRE_APPROVAL_NEVER.to_string(),
        });
    }

    Ok(Some(SessionUpdate {
        kind: "session.update".to_string(),
        session: SessionToolConfig { tools },
    }))
}
