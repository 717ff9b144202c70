//! Raw transport statistics and the capability that produces them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;

/// Optional statistics capability of a live connection.
///
/// Connections that cannot report transport statistics simply do not hand
/// one out; telemetry is then disabled for that session.
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    /// Reads the current cumulative transport statistics.
    async fn query_statistics(&self) -> Result<TransportStatsReport, TelemetryError>;
}

/// Outbound audio RTP counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundAudioStats {
    pub bytes_sent: u64,
    pub packets_sent: u64,
    /// Loss reported by the remote end for our outbound stream.
    #[serde(default)]
    pub packets_lost: Option<i64>,
}

/// Inbound audio RTP counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundAudioStats {
    #[serde(default)]
    pub packets_lost: Option<i64>,
    #[serde(default)]
    pub jitter_seconds: Option<f64>,
}

/// The selected ICE candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePairStats {
    #[serde(default)]
    pub current_round_trip_time_seconds: Option<f64>,
}

/// One statistics snapshot as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStatsReport {
    /// Report time in milliseconds on the transport's monotonic clock.
    pub timestamp_ms: f64,
    #[serde(default)]
    pub outbound_audio: Option<OutboundAudioStats>,
    #[serde(default)]
    pub inbound_audio: Option<InboundAudioStats>,
    #[serde(default)]
    pub candidate_pair: Option<CandidatePairStats>,
}

/// The counters a tick actually uses, extracted from a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCounters {
    pub timestamp_ms: f64,
    pub bytes_sent: u64,
    pub packets_sent: u64,
    /// Outbound and inbound loss summed.
    pub packets_lost: i64,
    pub jitter_seconds: f64,
    pub rtt_seconds: f64,
}

impl TransportStatsReport {
    /// Extracts the counters, defaulting absent jitter and round-trip time
    /// to zero.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Malformed` when outbound audio counters are
    /// missing or a reported time value is not finite.
    pub fn counters(&self) -> Result<RawCounters, TelemetryError> {
        if !self.timestamp_ms.is_finite() {
            return Err(TelemetryError::Malformed(format!(
                "timestamp is not finite: {}",
                self.timestamp_ms
            )));
        }

        let outbound = self.outbound_audio.ok_or_else(|| {
            TelemetryError::Malformed("missing outbound audio counters".to_string())
        })?;

        let jitter_seconds = self
            .inbound_audio
            .and_then(|inbound| inbound.jitter_seconds)
            .unwrap_or(0.0);
        let rtt_seconds = self
            .candidate_pair
            .and_then(|pair| pair.current_round_trip_time_seconds)
            .unwrap_or(0.0);

        if !jitter_seconds.is_finite() || !rtt_seconds.is_finite() {
            return Err(TelemetryError::Malformed(
                "jitter or round-trip time is not finite".to_string(),
            ));
        }

        let inbound_lost = self
            .inbound_audio
            .and_then(|inbound| inbound.packets_lost)
            .unwrap_or(0);
        let packets_lost = outbound
            .packets_lost
            .unwrap_or(0)
            .checked_add(inbound_lost)
            .ok_or_else(|| {
                TelemetryError::Malformed("packet loss counters overflow".to_string())
            })?;

        Ok(RawCounters {
            timestamp_ms: self.timestamp_ms,
            bytes_sent: outbound.bytes_sent,
            packets_sent: outbound.packets_sent,
            packets_lost,
            jitter_seconds,
            rtt_seconds,
        })
    }
}
