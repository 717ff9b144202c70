//! Voice session orchestration for the Concierge platform.
//!
//! [`VoiceConsole`] drives one guest's connection to a remote voice agent:
//! it fetches a short-lived credential, compiles the instruction document
//! from the guest's context, acquires the microphone, opens the realtime
//! session, configures tool servers, and attaches telemetry.
//!
//! The platform pieces are capability traits so the console never depends
//! on a particular media stack or transport:
//!
//! - [`CredentialProvider`] issues credentials ([`HttpCredentialClient`] in
//!   production).
//! - [`MediaDevices`] / [`AudioCapture`] own the microphone.
//! - [`RealtimeConnector`] / [`RealtimeSession`] carry the conversation.
//!
//! [`CredentialService`] is the issuing side, used by `concierge-server`.

pub mod config;
pub mod console;
pub mod credential;
pub mod error;
pub mod media;
pub mod service;
pub mod tools;
pub mod transport;

pub use config::{ConsoleConfig, CredentialEndpointConfig, CredentialServiceConfig};
pub use console::{
    ConsoleEvent, ConsoleMessage, MessageLevel, VoiceConsole, MAX_CONSOLE_MESSAGES,
};
pub use credential::{
    CredentialGrant, CredentialProvider, CredentialRequest, HttpCredentialClient,
    ToolServerDescriptor,
};
pub use error::VoiceError;
pub use media::{AudioCapture, AudioInputDevice, CaptureConstraints, MediaDevices};
pub use service::CredentialService;
pub use tools::{build_session_update, McpToolConfig, SessionToolConfig, SessionUpdate};
pub use transport::{RealtimeConnector, RealtimeSession, SessionOpenRequest};
