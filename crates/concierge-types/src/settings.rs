//! Per-connection session settings.
//!
//! Settings are read twice during a connection attempt: once when the
//! instruction document is compiled and once when tool-server capabilities
//! are negotiated. A connection attempt works on its own copy, so edits made
//! while connecting only take effect on the next attempt.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Language code used when `custom` is selected without a code.
pub const DEFAULT_CUSTOM_LANGUAGE_CODE: &str = "en";

/// Capture quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityPreset {
    /// Higher sample rate, lower target latency.
    #[default]
    Hd,
    /// Lower sample rate for constrained networks.
    LowBandwidth,
}

impl QualityPreset {
    /// Returns the wire label for this preset.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hd => "hd",
            Self::LowBandwidth => "low-bandwidth",
        }
    }
}

impl std::fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hd" => Ok(Self::Hd),
            "low-bandwidth" => Ok(Self::LowBandwidth),
            _ => Err(ParseSettingError::QualityPreset(s.to_string())),
        }
    }
}

/// How the agent chooses its response language.
///
/// Serialized as a single string: `"auto"`, `"custom"`, or an ISO code
/// such as `"fr"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LanguagePreference {
    /// Detect and mirror the guest's spoken language.
    #[default]
    Auto,
    /// Use [`SessionSettings::custom_language_code`].
    Custom,
    /// A fixed ISO language code.
    Code(String),
}

impl From<String> for LanguagePreference {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "auto" => Self::Auto,
            "custom" => Self::Custom,
            code => Self::Code(code.to_string()),
        }
    }
}

impl From<LanguagePreference> for String {
    fn from(value: LanguagePreference) -> Self {
        match value {
            LanguagePreference::Auto => "auto".to_string(),
            LanguagePreference::Custom => "custom".to_string(),
            LanguagePreference::Code(code) => code,
        }
    }
}

/// Which tools of each configured tool server the agent may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpExposureMode {
    /// Every tool each server offers.
    #[default]
    All,
    /// Only the `serverLabel:toolName` pairs listed in the settings.
    Manual,
}

/// A parsed `serverLabel:toolName` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToolSelection<'a> {
    pub server_label: &'a str,
    pub tool_name: &'a str,
}

impl<'a> ToolSelection<'a> {
    /// Parses an entry, splitting on the first `:`.
    ///
    /// Returns `None` when either half is empty or the separator is missing.
    pub fn parse(entry: &'a str) -> Option<Self> {
        let (server_label, tool_name) = entry.split_once(':')?;
        let server_label = server_label.trim();
        let tool_name = tool_name.trim();
        if server_label.is_empty() || tool_name.is_empty() {
            return None;
        }
        Some(Self {
            server_label,
            tool_name,
        })
    }
}

/// Settings for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    #[serde(default)]
    pub quality_preset: QualityPreset,
    #[serde(default)]
    pub preferred_language: LanguagePreference,
    /// Only consulted when `preferred_language` is `custom`.
    #[serde(default)]
    pub custom_language_code: Option<String>,
    #[serde(default)]
    pub operator_notes: String,
    #[serde(default)]
    pub mcp_exposure_mode: McpExposureMode,
    /// `serverLabel:toolName` entries, only consulted in manual mode.
    #[serde(default)]
    pub included_mcp_tools: BTreeSet<String>,
}

impl SessionSettings {
    /// Returns the custom language code, or `"en"` when absent or blank.
    pub fn custom_language_code_or_default(&self) -> &str {
        self.custom_language_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_CUSTOM_LANGUAGE_CODE)
    }

    /// Returns the tool names selected for `server_label`, in sorted order.
    ///
    /// Malformed entries are skipped.
    pub fn selected_tools_for(&self, server_label: &str) -> Vec<String> {
        self.included_mcp_tools
            .iter()
            .filter_map(|entry| ToolSelection::parse(entry))
            .filter(|selection| selection.server_label == server_label)
            .map(|selection| selection.tool_name.to_string())
            .collect()
    }
}

/// Error returned when parsing an unknown setting value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSettingError {
    #[error("unknown quality preset: {0}")]
    QualityPreset(String),
}
