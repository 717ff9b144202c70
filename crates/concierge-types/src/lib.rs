//! Shared types for the Concierge voice platform.
//!
//! This crate provides the data model used across all Concierge crates:
//! the guest and weather inputs that feed the instruction document, the
//! per-connection [`SessionSettings`], and the [`VoiceConnectionState`]
//! machine states owned by the voice console.
//!
//! No crate in the workspace depends on anything *except* `concierge-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

use serde::{Deserialize, Serialize};

mod guest;
mod settings;

pub use guest::{Guest, StayInfo, WeatherSnapshot};
pub use settings::{
    LanguagePreference, McpExposureMode, ParseSettingError, QualityPreset, SessionSettings,
    ToolSelection,
};

/// Connection states of a voice console.
///
/// `Idle` is the initial state. `Error` is recoverable: calling `connect`
/// again moves the console back to `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceConnectionState {
    /// No session or capture is held.
    #[default]
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// A live session exists.
    Connected,
    /// Resources are being released.
    Disconnecting,
    /// The last connection attempt failed; resources were rolled back.
    Error,
}

impl VoiceConnectionState {
    /// Returns the string label for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Error => "error",
        }
    }

    /// Whether the console may hold a capture or session in this state.
    pub fn may_hold_resources(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Disconnecting)
    }
}

impl std::fmt::Display for VoiceConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
