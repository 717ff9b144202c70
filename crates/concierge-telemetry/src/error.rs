//! Error types for the telemetry sampler.

/// Errors that can occur while reading transport statistics.
///
/// None of these are fatal: the sampler logs them and skips the tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TelemetryError {
    /// The statistics query itself failed.
    #[error("statistics query failed: {0}")]
    Query(String),

    /// The report did not contain the counters the sampler needs.
    #[error("malformed statistics report: {0}")]
    Malformed(String),

    /// The connection does not expose a statistics capability.
    #[error("statistics are not supported by this connection")]
    Unsupported,
}
