//! Per-tick delta computation over cumulative counters.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::TelemetryError;
use crate::sample::{round1, VoiceTelemetrySample};
use crate::stats::{RawCounters, TransportStatsReport};

/// Previous tick's raw counters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline {
    timestamp_ms: f64,
    bytes_sent: u64,
    packets_sent: u64,
    packets_lost: i64,
}

impl From<&RawCounters> for Baseline {
    fn from(counters: &RawCounters) -> Self {
        Self {
            timestamp_ms: counters.timestamp_ms,
            bytes_sent: counters.bytes_sent,
            packets_sent: counters.packets_sent,
            packets_lost: counters.packets_lost,
        }
    }
}

/// Running baseline plus a bounded, oldest-evicted sample history.
///
/// Holds no timer and does no I/O, so every tick can be driven directly.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    history_size: usize,
    baseline: Option<Baseline>,
    history: VecDeque<VoiceTelemetrySample>,
}

impl SampleWindow {
    /// Creates an empty window. A `history_size` of zero is treated as one.
    pub fn new(history_size: usize) -> Self {
        let history_size = history_size.max(1);
        Self {
            history_size,
            baseline: None,
            history: VecDeque::with_capacity(history_size),
        }
    }

    /// Computes a sample from `report`, advances the baseline, and appends
    /// the sample to the history.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Malformed` if the report lacks the required
    /// counters. Baseline and history are left untouched in that case.
    pub fn record(
        &mut self,
        report: &TransportStatsReport,
        at: DateTime<Utc>,
    ) -> Result<VoiceTelemetrySample, TelemetryError> {
        let counters = report.counters()?;

        let (bitrate_kbps, packet_loss_pct) = match self.baseline {
            None => (None, None),
            Some(baseline) => (
                bitrate_kbps(&baseline, &counters),
                packet_loss_pct(&baseline, &counters),
            ),
        };

        let sample = VoiceTelemetrySample {
            timestamp: at,
            bitrate_kbps,
            packet_loss_pct,
            jitter_ms: round1(counters.jitter_seconds * 1000.0),
            rtt_ms: round1(counters.rtt_seconds * 1000.0),
        };

        self.baseline = Some(Baseline::from(&counters));
        self.history.push_back(sample);
        while self.history.len() > self.history_size {
            self.history.pop_front();
        }

        Ok(sample)
    }

    /// Discards the baseline and the history.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.history.clear();
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    /// Samples, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &VoiceTelemetrySample> {
        self.history.iter()
    }

    pub fn latest(&self) -> Option<VoiceTelemetrySample> {
        self.history.back().copied()
    }
}

fn bitrate_kbps(baseline: &Baseline, now: &RawCounters) -> Option<f64> {
    let time_delta_ms = now.timestamp_ms - baseline.timestamp_ms;
    if time_delta_ms <= 0.0 {
        return None;
    }
    let bytes_delta = now.bytes_sent as f64 - baseline.bytes_sent as f64;
    // bytes * 8 / ms == kilobits per second
    Some(round1((8.0 * bytes_delta / time_delta_ms).max(0.0)))
}

fn packet_loss_pct(baseline: &Baseline, now: &RawCounters) -> Option<f64> {
    let packets_delta = now.packets_sent as f64 - baseline.packets_sent as f64;
    let lost_delta = now.packets_lost.saturating_sub(baseline.packets_lost) as f64;
    let total = packets_delta + lost_delta;
    if total <= 0.0 {
        return None;
    }
    Some(round1(lost_delta.max(0.0) / total.max(1.0) * 100.0))
}
