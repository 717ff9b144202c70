//! Connection health telemetry for Concierge voice sessions.
//!
//! Converts a live connection's cumulative transport counters into
//! per-interval metrics (bitrate, packet loss, jitter, round-trip time) and
//! classifies the most recent sample as healthy, degraded, or critical.
//!
//! # Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`StatisticsSource`] | optional capability a connection exposes for stats queries |
//! | [`SampleWindow`] | pure per-tick delta computation, baseline, bounded history |
//! | [`TelemetrySampler`] | owns the polling task and the window for one attachment |
//! | [`classify`] | threshold classification of a single sample |
//!
//! # Usage
//!
//! ```rust,ignore
//! use concierge_telemetry::{SamplerConfig, TelemetrySampler};
//!
//! let mut sampler = TelemetrySampler::new(SamplerConfig::default());
//! sampler.attach(session_stats_source);
//! let mut samples = sampler.subscribe();
//! while let Ok(sample) = samples.recv().await {
//!     tracing::info!(status = ?concierge_telemetry::classify(&sample), "voice link");
//! }
//! ```

mod error;
mod sample;
mod sampler;
mod stats;
mod window;

pub use error::TelemetryError;
pub use sample::{classify, round1, HealthStatus, VoiceTelemetrySample};
pub use sampler::{SamplerConfig, TelemetrySampler};
pub use stats::{
    CandidatePairStats, InboundAudioStats, OutboundAudioStats, RawCounters, StatisticsSource,
    TransportStatsReport,
};
pub use window::SampleWindow;
