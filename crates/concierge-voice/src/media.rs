//! Microphone capture capability.
//!
//! The platform implements [`MediaDevices`] and [`AudioCapture`]; the console
//! only ever talks to these traits.

use crate::error::VoiceError;
use async_trait::async_trait;
use concierge_types::QualityPreset;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An audio input the platform reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInputDevice {
    pub device_id: String,
    pub label: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Constraints requested when acquiring the microphone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    /// Exact device to capture from; `None` lets the platform choose.
    pub device_id: Option<String>,
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub target_latency_ms: u32,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl CaptureConstraints {
    pub fn for_preset(preset: QualityPreset, device_id: Option<&str>) -> Self {
        let (sample_rate_hz, target_latency_ms) = match preset {
            QualityPreset::Hd => (48_000, 10),
            QualityPreset::LowBandwidth => (16_000, 40),
        };

        Self {
            device_id: device_id.map(str::to_string),
            sample_rate_hz,
            channel_count: 1,
            target_latency_ms,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Platform media device access.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn enumerate_audio_inputs(&self) -> Result<Vec<AudioInputDevice>, VoiceError>;

    /// Acquires a live capture.
    ///
    /// Fails with `VoiceError::Device` on denied permission, missing or busy
    /// device.
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn AudioCapture>, VoiceError>;

    /// Fires whenever the set of audio inputs changes. Platforms without
    /// change notifications return `None`.
    fn device_changes(&self) -> Option<broadcast::Receiver<()>> {
        None
    }
}

/// A live microphone capture with a single audio track.
///
/// All methods are synchronous so a capture can be released from `Drop`.
pub trait AudioCapture: Send + Sync {
    fn id(&self) -> &str;

    /// Whether the audio track is enabled, or `None` if the capture has no
    /// audio track.
    fn track_enabled(&self) -> Option<bool>;

    fn set_track_enabled(&mut self, enabled: bool);

    /// Releases the device. Calling it more than once is harmless.
    fn stop(&mut self);
}
