use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use concierge_types::QualityPreset;
use concierge_voice::{
    ConsoleConfig, CredentialEndpointConfig, CredentialProvider, CredentialRequest,
    CredentialService, CredentialServiceConfig, HttpCredentialClient, ToolServerDescriptor,
    VoiceError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

const DEFAULT_URL: &str = "ws://localhost:7880";
const DEFAULT_KEY: &str = "devkey";
const DEFAULT_SECRET: &str = "secret";

fn request() -> CredentialRequest {
    CredentialRequest {
        session_id: Uuid::new_v4(),
        quality: QualityPreset::Hd,
        voice: "alloy".to_string(),
    }
}

/// Serves `router` on an ephemeral port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{}", addr)
}

fn client_for(url: String, api_key: &str) -> HttpCredentialClient {
    HttpCredentialClient::new(&CredentialEndpointConfig {
        url,
        api_key: api_key.to_string(),
        timeout_seconds: 5,
    })
    .expect("client")
}

// ── HttpCredentialClient ─────────────────────────────────────────────

#[tokio::test]
async fn test_client_parses_grant() {
    let router = Router::new().route(
        "/api/voice/session",
        post(|| async {
            Json(json!({
                "credential": "ephemeral",
                "expiresInSeconds": 60,
                "url": "wss://voice.example.com",
                "toolServers": [
                    { "name": "support", "url": "https://tools.example.com/mcp" }
                ]
            }))
        }),
    );
    let base = serve(router).await;
    let client = client_for(format!("{}/api/voice/session", base), "console-key");

    let grant = client.request_credential(&request()).await.expect("grant");

    assert_eq!(grant.credential, "ephemeral");
    assert_eq!(grant.expires_in_seconds, 60);
    assert_eq!(grant.server_url.as_deref(), Some("wss://voice.example.com"));
    assert_eq!(grant.tool_servers.len(), 1);
    assert_eq!(grant.tool_servers[0].label.as_deref(), Some("support"));
}

#[tokio::test]
async fn test_client_forwards_request_body_and_key() {
    let router = Router::new().route(
        "/session",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer console-key");
            if !authorized || body["quality"] != "hd" || body["voice"] != "alloy" {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad request" })));
            }
            (StatusCode::OK, Json(json!({ "credential": "ok" })))
        }),
    );
    let base = serve(router).await;

    let grant = client_for(format!("{}/session", base), "console-key")
        .request_credential(&request())
        .await
        .expect("grant");
    assert_eq!(grant.credential, "ok");
    assert!(grant.tool_servers.is_empty());
}

#[tokio::test]
async fn test_client_rejects_non_success_status() {
    let router = Router::new().route(
        "/session",
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "voice service unavailable" })),
            )
        }),
    );
    let base = serve(router).await;

    let err = client_for(format!("{}/session", base), "")
        .request_credential(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, VoiceError::Credential(msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_client_rejects_missing_credential() {
    let router = Router::new().route(
        "/session",
        post(|| async { Json(json!({ "expiresInSeconds": 60 })) }),
    );
    let base = serve(router).await;

    let err = client_for(format!("{}/session", base), "")
        .request_credential(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, VoiceError::Credential(_)));
}

#[tokio::test]
async fn test_client_reports_unreachable_endpoint() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(format!("http://{}/session", addr), "")
        .request_credential(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, VoiceError::Credential(_)));
}

// ── CredentialService ────────────────────────────────────────────────

#[derive(Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
    video: VideoClaims,
}

#[derive(Deserialize)]
struct VideoClaims {
    #[serde(rename = "canPublish")]
    can_publish: bool,
    #[serde(rename = "canSubscribe")]
    can_subscribe: bool,
    #[serde(rename = "roomJoin")]
    room_join: bool,
    room: String,
}

fn decode_claims(token: &str) -> Claims {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(DEFAULT_SECRET.as_bytes());
    decode::<Claims>(token, &key, &validation)
        .expect("Failed to decode token")
        .claims
}

#[test]
fn test_issue_scopes_token_to_session_room() {
    let service = CredentialService::new(CredentialServiceConfig::new(
        DEFAULT_URL,
        DEFAULT_KEY,
        DEFAULT_SECRET,
    ));
    let req = request();

    let grant = service.issue(&req).expect("issue");
    let claims = decode_claims(&grant.credential);

    assert_eq!(claims.sub, format!("guest-{}", req.session_id));
    assert_eq!(claims.video.room, format!("concierge-{}", req.session_id));
    assert!(claims.video.room_join, "roomJoin should be true");
    assert!(claims.video.can_publish, "canPublish should be true");
    assert!(claims.video.can_subscribe, "canSubscribe should be true");
    assert_eq!(grant.server_url.as_deref(), Some(DEFAULT_URL));
}

#[test]
fn test_issue_honors_ttl() {
    let mut config = CredentialServiceConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    config.token_ttl_seconds = 120;
    let service = CredentialService::new(config);

    let grant = service.issue(&request()).expect("issue");
    let claims = decode_claims(&grant.credential);

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    assert_eq!(grant.expires_in_seconds, 120);
    assert!((118..=122).contains(&(claims.exp - now)), "exp {} now {}", claims.exp, now);
}

#[test]
fn test_issue_returns_configured_tool_servers() {
    let mut config = CredentialServiceConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    config.tool_servers = vec![ToolServerDescriptor {
        label: Some("support".to_string()),
        url: Some("https://tools.example.com/mcp".to_string()),
        authorization: Some("Bearer tool-secret".to_string()),
    }];
    let service = CredentialService::new(config);

    let grant = service.issue(&request()).expect("issue");
    assert_eq!(grant.tool_servers.len(), 1);
    assert_eq!(
        grant.tool_servers[0].authorization.as_deref(),
        Some("Bearer tool-secret")
    );
}

#[test]
fn test_disabled_service_refuses_to_issue() {
    let service = CredentialService::new(CredentialServiceConfig::default());
    assert!(!service.is_enabled());
    assert!(matches!(
        service.issue(&request()),
        Err(VoiceError::Config(_))
    ));
}

// ── configuration ────────────────────────────────────────────────────

#[test]
fn test_console_config_from_toml() {
    let toml_str = r#"
        voice = "verse"

        [credential_endpoint]
        url = "https://concierge.example.com/api/voice/session"
        api_key = "console-key"

        [telemetry]
        interval_ms = 1000
    "#;

    let config: ConsoleConfig = toml::from_str(toml_str).expect("parse TOML");
    assert_eq!(config.voice, "verse");
    assert_eq!(config.credential_endpoint.api_key, "console-key");
    assert_eq!(config.credential_endpoint.timeout_seconds, 10);
    assert_eq!(config.telemetry.interval_ms, 1000);
    assert_eq!(config.telemetry.history_size, 20);
}

#[test]
fn test_console_config_defaults() {
    let config: ConsoleConfig = toml::from_str("").expect("parse TOML");
    assert_eq!(config, ConsoleConfig::default());
    assert_eq!(config.voice, "alloy");
}

#[test]
fn test_service_config_with_tool_servers_toml() {
    let toml_str = r#"
        url = "ws://localhost:7880"
        api_key = "key"
        api_secret = "secret"

        [[tool_servers]]
        label = "support"
        url = "https://tools.example.com/mcp"

        [[tool_servers]]
        name = "lights"
        url = "https://lights.example.com/mcp"
        authorization = "Bearer x"
    "#;

    let config: CredentialServiceConfig = toml::from_str(toml_str).expect("parse TOML");
    assert_eq!(config.token_ttl_seconds, 60);
    assert_eq!(config.tool_servers.len(), 2);
    assert_eq!(config.tool_servers[1].label.as_deref(), Some("lights"));
}

#[test]
fn test_config_debug_redacts_secrets() {
    let mut service = CredentialServiceConfig::new(DEFAULT_URL, DEFAULT_KEY, "top-secret");
    service.tool_servers = vec![ToolServerDescriptor {
        label: Some("support".to_string()),
        url: None,
        authorization: Some("Bearer tool-secret".to_string()),
    }];
    let debug = format!("{:?}", service);
    assert!(!debug.contains("top-secret"));
    assert!(!debug.contains("tool-secret"));

    let endpoint = CredentialEndpointConfig {
        url: "https://example.com".to_string(),
        api_key: "console-key".to_string(),
        timeout_seconds: 10,
    };
    assert!(!format!("{:?}", endpoint).contains("console-key"));
}
