use thiserror::Error;

/// Failures of a voice connection attempt.
///
/// The console catches every variant at the `connect` boundary, rolls back
/// whatever the attempt acquired, and keeps the error for inspection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// Token endpoint unreachable, non-success response, or malformed payload.
    #[error("credential error: {0}")]
    Credential(String),

    /// Microphone permission denied, no device, or device busy.
    #[error("device error: {0}")]
    Device(String),

    /// Session handshake or transport failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// A tool-server descriptor is unusable (e.g. missing its URL).
    #[error("tool configuration error: {0}")]
    ToolConfiguration(String),

    /// Access token signing failed.
    #[error("token signing error: {0}")]
    Token(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VoiceError {
    /// One-line message suitable for the guest-facing transcript.
    pub fn user_message(&self) -> String {
        match self {
            Self::Credential(_) | Self::Token(_) => {
                "Couldn't start the voice session: the voice service did not issue a session credential.".to_string()
            }
            Self::Device(detail) => format!("Couldn't access the microphone: {detail}."),
            Self::Connection(_) => {
                "Couldn't reach the voice agent. Check the network connection and try again.".to_string()
            }
            Self::ToolConfiguration(detail) => {
                format!("The voice session's tool servers are misconfigured: {detail}.")
            }
            Self::Config(detail) => format!("Voice is not configured correctly: {detail}."),
        }
    }
}

impl From<livekit_api::access_token::AccessTokenError> for VoiceError {
    fn from(e: livekit_api::access_token::AccessTokenError) -> Self {
        Self::Token(e.to_string())
    }
}
