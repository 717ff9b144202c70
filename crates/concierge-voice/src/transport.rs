//! Connection to the remote voice agent.

use crate::error::VoiceError;
use crate::media::AudioCapture;
use crate::tools::SessionUpdate;
use async_trait::async_trait;
use concierge_telemetry::StatisticsSource;
use std::sync::Arc;

/// Everything needed to open a session.
pub struct SessionOpenRequest<'a> {
    pub credential: &'a str,
    pub instructions: &'a str,
    pub voice: &'a str,
    pub capture: &'a dyn AudioCapture,
    /// Server named by the credential grant, if any.
    pub server_url: Option<&'a str>,
}

/// Opens sessions with the remote voice agent.
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    /// Performs the handshake. Fails with `VoiceError::Connection`.
    async fn open(
        &self,
        request: SessionOpenRequest<'_>,
    ) -> Result<Box<dyn RealtimeSession>, VoiceError>;
}

/// An open session with the remote voice agent.
#[async_trait]
pub trait RealtimeSession: Send + Sync {
    fn id(&self) -> &str;

    async fn send_session_update(&mut self, update: &SessionUpdate) -> Result<(), VoiceError>;

    /// Ends the session. Calling it more than once is harmless.
    async fn close(&mut self);

    /// Transport statistics, for sessions that can report them.
    fn statistics(&self) -> Option<Arc<dyn StatisticsSource>> {
        None
    }
}
