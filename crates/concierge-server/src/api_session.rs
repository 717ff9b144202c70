use crate::api::ApiError;
use crate::AppState;
use axum::{Extension, Json};
use concierge_voice::{CredentialGrant, CredentialRequest};
use std::sync::Arc;

/// Longest accepted voice name.
const MAX_VOICE_LEN: usize = 64;

/// POST /api/voice/session
///
/// Issues a short-lived credential for one voice session, along with the
/// tool servers the agent may use.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CredentialRequest>,
) -> Result<Json<CredentialGrant>, ApiError> {
    let voice = request.voice.trim();
    if voice.is_empty() {
        return Err(ApiError::BadRequest("voice must not be empty".to_string()));
    }
    if voice.len() > MAX_VOICE_LEN {
        return Err(ApiError::BadRequest(format!(
            "voice must be at most {} characters",
            MAX_VOICE_LEN
        )));
    }

    if !state.credentials.is_enabled() {
        return Err(ApiError::ServiceUnavailable(
            "voice service is not configured".to_string(),
        ));
    }

    let grant = state.credentials.issue(&request)?;
    Ok(Json(grant))
}
