use crate::config::CredentialServiceConfig;
use crate::credential::{CredentialGrant, CredentialRequest};
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;

/// Mints short-lived session credentials.
///
/// Each credential is a signed access token scoped to a single room named
/// after the requesting session.
#[derive(Debug)]
pub struct CredentialService {
    config: CredentialServiceConfig,
}

impl CredentialService {
    pub fn new(config: CredentialServiceConfig) -> Self {
        Self { config }
    }

    /// Returns false when no realtime server URL is configured.
    pub fn is_enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.config.token_ttl_seconds)
    }

    /// Room a session's credential grants access to.
    pub fn room_name(request: &CredentialRequest) -> String {
        format!("concierge-{}", request.session_id)
    }

    /// Issues a credential for `request`.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` if the service is disabled and
    /// `VoiceError::Token` if signing fails.
    pub fn issue(&self, request: &CredentialRequest) -> Result<CredentialGrant, VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::Config(
                "credential service has no realtime server URL".to_string(),
            ));
        }

        let identity = format!("guest-{}", request.session_id);
        let credential = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(&identity)
            .with_name(&format!("{} ({})", identity, request.voice))
            .with_grants(VideoGrants {
                room_join: true,
                room: Self::room_name(request),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(self.token_ttl())
            .to_jwt()?;

        tracing::info!(
            session_id = %request.session_id,
            quality = %request.quality,
            voice = %request.voice,
            ttl_seconds = self.config.token_ttl_seconds,
            "issued voice session credential"
        );

        Ok(CredentialGrant {
            credential,
            expires_in_seconds: self.config.token_ttl_seconds,
            server_url: Some(self.config.url.clone()),
            tool_servers: self.config.tool_servers.clone(),
        })
    }
}
