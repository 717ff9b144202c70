//! Timer-driven sampling of an attached connection.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::sample::{classify, HealthStatus, VoiceTelemetrySample};
use crate::stats::StatisticsSource;
use crate::window::SampleWindow;

/// Capacity of the sample broadcast channel.
const SAMPLE_BROADCAST_CAPACITY: usize = 64;

fn default_interval_ms() -> u64 {
    3000
}

fn default_history_size() -> usize {
    20
}

/// Sampler construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Polling period in milliseconds. Default: 3000.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Number of samples kept in history. Default: 20.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            history_size: default_history_size(),
        }
    }
}

impl SamplerConfig {
    /// Polling period, never shorter than one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

#[derive(Debug)]
struct Shared {
    window: SampleWindow,
    /// Bumped on every attach and detach so a tick that straddles one is
    /// dropped instead of landing in the new window.
    generation: u64,
}

/// Polls an attached [`StatisticsSource`] on a fixed interval.
///
/// At most one polling task runs at a time. Attaching a new source or
/// detaching stops the current task and discards the baseline and history.
/// Dropping the sampler aborts its task.
#[derive(Debug)]
pub struct TelemetrySampler {
    config: SamplerConfig,
    shared: Arc<Mutex<Shared>>,
    task: Option<JoinHandle<()>>,
    samples_tx: broadcast::Sender<VoiceTelemetrySample>,
}

impl TelemetrySampler {
    pub fn new(config: SamplerConfig) -> Self {
        let (samples_tx, _) = broadcast::channel(SAMPLE_BROADCAST_CAPACITY);
        Self {
            config,
            shared: Arc::new(Mutex::new(Shared {
                window: SampleWindow::new(config.history_size),
                generation: 0,
            })),
            task: None,
            samples_tx,
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Starts sampling `source`, replacing any previous attachment.
    ///
    /// The first poll runs immediately, then every `interval_ms`. Must be
    /// called from within a Tokio runtime.
    pub fn attach(&mut self, source: Arc<dyn StatisticsSource>) {
        self.stop_task();
        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.window.reset();
            shared.generation
        };

        tracing::debug!(
            interval_ms = self.config.interval_ms,
            history_size = self.config.history_size,
            "attaching telemetry sampler"
        );

        self.task = Some(tokio::spawn(poll_loop(
            source,
            Arc::clone(&self.shared),
            self.samples_tx.clone(),
            self.config.interval(),
            generation,
        )));
    }

    /// Stops sampling and clears baseline and history. Safe to call when
    /// nothing is attached.
    pub fn detach(&mut self) {
        let was_active = self.stop_task();
        let mut shared = lock(&self.shared);
        shared.generation += 1;
        shared.window.reset();
        if was_active {
            tracing::debug!("telemetry sampler detached");
        }
    }

    /// Whether a polling task is running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Samples, oldest first.
    pub fn history(&self) -> Vec<VoiceTelemetrySample> {
        lock(&self.shared).window.history().copied().collect()
    }

    pub fn latest(&self) -> Option<VoiceTelemetrySample> {
        lock(&self.shared).window.latest()
    }

    /// Health of the most recent sample, or `None` before the first one.
    pub fn status(&self) -> Option<HealthStatus> {
        self.latest().as_ref().map(classify)
    }

    /// Receives every sample produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<VoiceTelemetrySample> {
        self.samples_tx.subscribe()
    }

    fn stop_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TelemetrySampler {
    fn drop(&mut self) {
        self.stop_task();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

async fn poll_loop(
    source: Arc<dyn StatisticsSource>,
    shared: Arc<Mutex<Shared>>,
    samples_tx: broadcast::Sender<VoiceTelemetrySample>,
    interval: Duration,
    generation: u64,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let report = match source.query_statistics().await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("telemetry tick skipped: {}", e);
                continue;
            }
        };

        let recorded = {
            let mut shared = lock(&shared);
            if shared.generation != generation {
                return;
            }
            shared.window.record(&report, Utc::now())
        };

        match recorded {
            Ok(sample) => {
                tracing::trace!(
                    bitrate_kbps = ?sample.bitrate_kbps,
                    packet_loss_pct = ?sample.packet_loss_pct,
                    jitter_ms = sample.jitter_ms,
                    rtt_ms = sample.rtt_ms,
                    "telemetry sample"
                );
                // No subscribers is fine; history still holds the sample.
                let _ = samples_tx.send(sample);
            }
            Err(e) => {
                tracing::warn!("telemetry tick skipped: {}", e);
            }
        }
    }
}
