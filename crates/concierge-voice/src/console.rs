//! The voice session console.
//!
//! [`VoiceConsole`] owns the microphone capture, the remote session, and the
//! telemetry sampler for one guest-facing voice surface. It drives the
//! [`VoiceConnectionState`] machine:
//!
//! ```text
//! idle -> connecting -> connected -> disconnecting -> idle
//!            |              |              |
//!            +----------> error <----------+
//! ```
//!
//! Every failure during a connection attempt is caught at the
//! [`VoiceConsole::connect`] boundary. The attempt's resources are rolled
//! back, the console moves to `error`, and a conversational message is
//! recorded. A later `connect` retries from `error`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use concierge_context::{compile_instructions, ContextRegistry};
use concierge_telemetry::TelemetrySampler;
use concierge_types::{Guest, SessionSettings, VoiceConnectionState, WeatherSnapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::ConsoleConfig;
use crate::credential::{CredentialProvider, CredentialRequest};
use crate::error::VoiceError;
use crate::media::{AudioCapture, AudioInputDevice, CaptureConstraints, MediaDevices};
use crate::tools::build_session_update;
use crate::transport::{RealtimeConnector, RealtimeSession, SessionOpenRequest};

/// Capacity of the console event broadcast channel.
const EVENT_BROADCAST_CAPACITY: usize = 64;

const CONNECTED_MESSAGE: &str =
    "You're connected to the concierge. Go ahead and speak whenever you're ready.";
const DISCONNECTED_MESSAGE: &str = "The voice session has ended.";

/// Transcript length kept by [`VoiceConsole::messages`]; older lines are
/// dropped first.
pub const MAX_CONSOLE_MESSAGES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Error,
}

/// A line in the console's conversational transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    pub level: MessageLevel,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Notifications published by the console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    StateChanged(VoiceConnectionState),
    Message(ConsoleMessage),
    Muted(bool),
    DevicesChanged(Vec<AudioInputDevice>),
}

/// Orchestrates a guest's voice session.
///
/// All operations take `&mut self`, so a single owner drives the console
/// and connect/disconnect never interleave. At most one capture and one
/// session exist at any time.
pub struct VoiceConsole {
    config: ConsoleConfig,
    credentials: Arc<dyn CredentialProvider>,
    connector: Arc<dyn RealtimeConnector>,
    media: Arc<dyn MediaDevices>,

    state: VoiceConnectionState,
    session_id: Option<Uuid>,
    capture: Option<Box<dyn AudioCapture>>,
    session: Option<Box<dyn RealtimeSession>>,
    telemetry: TelemetrySampler,

    guest: Option<Guest>,
    weather: Option<WeatherSnapshot>,
    settings: SessionSettings,
    context: ContextRegistry,

    devices: Vec<AudioInputDevice>,
    selected_device: Option<String>,

    last_error: Option<VoiceError>,
    messages: Vec<ConsoleMessage>,
    events_tx: broadcast::Sender<ConsoleEvent>,
}

impl std::fmt::Debug for VoiceConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceConsole")
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .field("has_capture", &self.capture.is_some())
            .field("has_session", &self.session.is_some())
            .field("selected_device", &self.selected_device)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl VoiceConsole {
    pub fn new(
        config: ConsoleConfig,
        credentials: Arc<dyn CredentialProvider>,
        connector: Arc<dyn RealtimeConnector>,
        media: Arc<dyn MediaDevices>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_BROADCAST_CAPACITY);
        let telemetry = TelemetrySampler::new(config.telemetry);
        Self {
            config,
            credentials,
            connector,
            media,
            state: VoiceConnectionState::Idle,
            session_id: None,
            capture: None,
            session: None,
            telemetry,
            guest: None,
            weather: None,
            settings: SessionSettings::default(),
            context: ContextRegistry::derive(None, None),
            devices: Vec::new(),
            selected_device: None,
            last_error: None,
            messages: Vec::new(),
            events_tx,
        }
    }

    // ── connection lifecycle ─────────────────────────────────────────

    /// Starts a voice session and returns the resulting state.
    ///
    /// Does nothing while another attempt is `connecting`. An existing
    /// session is torn down silently first, so calling this while connected
    /// reconnects. Failures leave the console in `error` with the cause in
    /// [`last_error`](Self::last_error).
    pub async fn connect(&mut self) -> VoiceConnectionState {
        if self.state == VoiceConnectionState::Connecting {
            tracing::debug!("connect ignored: attempt already in flight");
            return self.state;
        }

        if self.session.is_some() || self.capture.is_some() {
            self.disconnect(true).await;
        }

        self.last_error = None;
        self.set_state(VoiceConnectionState::Connecting);

        match self.establish().await {
            Ok(()) => {
                self.set_state(VoiceConnectionState::Connected);
                tracing::info!(
                    session_id = ?self.session_id,
                    quality = %self.settings.quality_preset,
                    telemetry = self.telemetry.is_active(),
                    "voice session connected"
                );
                self.push_message(MessageLevel::Info, CONNECTED_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::warn!("voice connection failed: {}", e);
                self.release_resources().await;
                self.set_state(VoiceConnectionState::Error);
                self.push_message(MessageLevel::Error, e.user_message());
                self.last_error = Some(e);
            }
        }

        self.state
    }

    /// Runs one connection attempt. Resources are stored on `self` as soon
    /// as they are acquired so a failure can roll them back.
    async fn establish(&mut self) -> Result<(), VoiceError> {
        let request = CredentialRequest {
            session_id: Uuid::new_v4(),
            quality: self.settings.quality_preset,
            voice: self.config.voice.clone(),
        };
        let grant = self.credentials.request_credential(&request).await?;

        let instructions = self.instructions();

        let constraints = CaptureConstraints::for_preset(
            self.settings.quality_preset,
            self.selected_device.as_deref(),
        );
        let capture = self.capture.insert(self.media.acquire(&constraints).await?);
        tracing::debug!(capture_id = capture.id(), "microphone capture acquired");

        let session = self
            .connector
            .open(SessionOpenRequest {
                credential: &grant.credential,
                instructions: &instructions,
                voice: &self.config.voice,
                capture: &**capture,
                server_url: grant.server_url.as_deref(),
            })
            .await?;
        let session = self.session.insert(session);

        if let Some(update) = build_session_update(&grant.tool_servers, &self.settings)? {
            session.send_session_update(&update).await?;
            tracing::debug!(
                tool_servers = update.session.tools.len(),
                "sent tool configuration"
            );
        }

        match session.statistics() {
            Some(source) => self.telemetry.attach(source),
            None => tracing::debug!("session exposes no statistics; telemetry disabled"),
        }

        self.session_id = Some(request.session_id);
        Ok(())
    }

    /// Ends the current session. Safe to call from any state.
    ///
    /// The session is closed before the capture is stopped. Unless `silent`,
    /// emits a message whenever the console was not already idle.
    pub async fn disconnect(&mut self, silent: bool) {
        let was_idle = self.state == VoiceConnectionState::Idle;
        if self.session.is_some() || self.capture.is_some() || self.state.may_hold_resources() {
            self.set_state(VoiceConnectionState::Disconnecting);
        }

        let released = self.release_resources().await;
        self.set_state(VoiceConnectionState::Idle);

        if released || !was_idle {
            tracing::info!(silent, released, "voice session disconnected");
            if !silent {
                self.push_message(MessageLevel::Info, DISCONNECTED_MESSAGE.to_string());
            }
        }
    }

    /// Consumes the console, releasing everything it holds.
    pub async fn teardown(mut self) {
        self.disconnect(true).await;
    }

    async fn release_resources(&mut self) -> bool {
        self.telemetry.detach();
        self.session_id = None;

        let mut released = false;
        if let Some(mut session) = self.session.take() {
            session.close().await;
            released = true;
        }
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
            released = true;
        }
        released
    }

    // ── capture controls ─────────────────────────────────────────────

    /// Flips the microphone track and returns whether it is now muted.
    /// Without an active capture this does nothing and returns `false`.
    pub fn toggle_mute(&mut self) -> bool {
        let Some(capture) = self.capture.as_mut() else {
            return false;
        };
        let Some(enabled) = capture.track_enabled() else {
            return false;
        };

        capture.set_track_enabled(!enabled);
        let muted = enabled;
        tracing::debug!(muted, "microphone toggled");
        let _ = self.events_tx.send(ConsoleEvent::Muted(muted));
        muted
    }

    pub fn is_muted(&self) -> bool {
        self.capture
            .as_ref()
            .and_then(|capture| capture.track_enabled())
            == Some(false)
    }

    /// Re-enumerates audio inputs. When nothing is selected yet, picks the
    /// platform default, or the first device if none is flagged.
    pub async fn refresh_devices(&mut self) -> Result<&[AudioInputDevice], VoiceError> {
        let devices = self.media.enumerate_audio_inputs().await?;
        if self.selected_device.is_none() {
            self.selected_device = devices
                .iter()
                .find(|d| d.is_default)
                .or_else(|| devices.first())
                .map(|d| d.device_id.clone());
        }
        tracing::debug!(
            count = devices.len(),
            selected = ?self.selected_device,
            "audio inputs refreshed"
        );
        self.devices = devices;
        let _ = self
            .events_tx
            .send(ConsoleEvent::DevicesChanged(self.devices.clone()));
        Ok(&self.devices)
    }

    /// Chooses the input used by the next connection attempt.
    pub fn select_device(&mut self, device_id: impl Into<String>) {
        self.selected_device = Some(device_id.into());
    }

    /// Platform device change notifications, if supported. Call
    /// [`refresh_devices`](Self::refresh_devices) on each.
    pub fn device_changes(&self) -> Option<broadcast::Receiver<()>> {
        self.media.device_changes()
    }

    pub fn devices(&self) -> &[AudioInputDevice] {
        &self.devices
    }

    pub fn selected_device(&self) -> Option<&str> {
        self.selected_device.as_deref()
    }

    // ── context inputs ───────────────────────────────────────────────

    /// Replaces the guest and re-derives every context section.
    pub fn set_guest(&mut self, guest: Option<Guest>) {
        self.guest = guest;
        self.context
            .rederive(self.guest.as_ref(), self.weather.as_ref());
    }

    /// Replaces the weather and re-derives every context section.
    pub fn set_weather(&mut self, weather: Option<WeatherSnapshot>) {
        self.weather = weather;
        self.context
            .rederive(self.guest.as_ref(), self.weather.as_ref());
    }

    /// Takes effect on the next connection attempt.
    pub fn set_settings(&mut self, settings: SessionSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn guest(&self) -> Option<&Guest> {
        self.guest.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn context(&self) -> &ContextRegistry {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextRegistry {
        &mut self.context
    }

    /// The instruction document the next connection would send.
    pub fn instructions(&self) -> String {
        compile_instructions(
            self.guest.as_ref(),
            self.weather.as_ref(),
            self.context.sections(),
            &self.settings,
        )
    }

    // ── observation ──────────────────────────────────────────────────

    pub fn state(&self) -> VoiceConnectionState {
        self.state
    }

    /// Identifier of the live session, if connected.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn last_error(&self) -> Option<&VoiceError> {
        self.last_error.as_ref()
    }

    pub fn messages(&self) -> &[ConsoleMessage] {
        &self.messages
    }

    pub fn telemetry(&self) -> &TelemetrySampler {
        &self.telemetry
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events_tx.subscribe()
    }

    fn set_state(&mut self, state: VoiceConnectionState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "voice state change");
        self.state = state;
        // No subscribers is fine.
        let _ = self.events_tx.send(ConsoleEvent::StateChanged(state));
    }

    fn push_message(&mut self, level: MessageLevel, text: String) {
        let message = ConsoleMessage {
            level,
            text,
            at: Utc::now(),
        };
        self.messages.push(message.clone());
        if self.messages.len() > MAX_CONSOLE_MESSAGES {
            let excess = self.messages.len() - MAX_CONSOLE_MESSAGES;
            self.messages.drain(..excess);
        }
        let _ = self.events_tx.send(ConsoleEvent::Message(message));
    }
}

impl Drop for VoiceConsole {
    fn drop(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            tracing::warn!(
                capture_id = capture.id(),
                "voice console dropped without teardown; stopping capture"
            );
            capture.stop();
        }
        if self.session.is_some() {
            tracing::warn!("voice console dropped with an open session");
        }
    }
}
