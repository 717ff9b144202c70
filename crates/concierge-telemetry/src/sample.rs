//! Telemetry samples and health classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Packet loss above which the link is critical.
const CRITICAL_PACKET_LOSS_PCT: f64 = 10.0;
const CRITICAL_JITTER_MS: f64 = 50.0;
const CRITICAL_RTT_MS: f64 = 250.0;

const DEGRADED_PACKET_LOSS_PCT: f64 = 5.0;
const DEGRADED_JITTER_MS: f64 = 30.0;
const DEGRADED_RTT_MS: f64 = 180.0;
/// Outbound bitrate below which speech quality suffers.
const DEGRADED_BITRATE_KBPS: f64 = 24.0;

/// One polling tick's derived metrics.
///
/// `bitrate_kbps` and `packet_loss_pct` are `None` on the first tick after
/// an attach, when there is no baseline to compute deltas against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceTelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub bitrate_kbps: Option<f64>,
    pub packet_loss_pct: Option<f64>,
    pub jitter_ms: f64,
    pub rtt_ms: f64,
}

/// Coarse connection health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a sample. Checks run in order and the first match wins:
/// critical thresholds before degraded ones. Missing metrics never match.
pub fn classify(sample: &VoiceTelemetrySample) -> HealthStatus {
    let loss_above = |limit: f64| sample.packet_loss_pct.is_some_and(|loss| loss > limit);

    if loss_above(CRITICAL_PACKET_LOSS_PCT)
        || sample.jitter_ms > CRITICAL_JITTER_MS
        || sample.rtt_ms > CRITICAL_RTT_MS
    {
        return HealthStatus::Critical;
    }

    if loss_above(DEGRADED_PACKET_LOSS_PCT)
        || sample.jitter_ms > DEGRADED_JITTER_MS
        || sample.rtt_ms > DEGRADED_RTT_MS
        || sample
            .bitrate_kbps
            .is_some_and(|bitrate| bitrate < DEGRADED_BITRATE_KBPS)
    {
        return HealthStatus::Degraded;
    }

    HealthStatus::Healthy
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
