//! Server configuration loading from file and environment variables.

use concierge_voice::CredentialServiceConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Credential minting settings.
    #[serde(default)]
    pub credentials: CredentialServiceConfig,

    /// Who may request credentials.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "concierge_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Bearer keys accepted on the credential endpoint.
///
/// An empty list leaves the endpoint open, which is only suitable for local
/// development.
#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_keys: Vec<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_keys", &format!("[{} REDACTED]", self.api_keys.len()))
            .finish()
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CONCIERGE_HOST` overrides `server.host`
/// - `CONCIERGE_PORT` overrides `server.port`
/// - `CONCIERGE_LOG_LEVEL` overrides `logging.level`
/// - `CONCIERGE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `CONCIERGE_LIVEKIT_URL` overrides `credentials.url`
/// - `CONCIERGE_LIVEKIT_API_KEY` overrides `credentials.api_key`
/// - `CONCIERGE_LIVEKIT_API_SECRET` overrides `credentials.api_secret`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies `CONCIERGE_*` overrides read through `lookup`.
///
/// Unparseable host and port values are ignored.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("CONCIERGE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("CONCIERGE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("CONCIERGE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("CONCIERGE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(url) = lookup("CONCIERGE_LIVEKIT_URL") {
        config.credentials.url = url;
    }
    if let Some(key) = lookup("CONCIERGE_LIVEKIT_API_KEY") {
        config.credentials.api_key = key;
    }
    if let Some(secret) = lookup("CONCIERGE_LIVEKIT_API_SECRET") {
        config.credentials.api_secret = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.credentials.token_ttl_seconds, 60);
        assert!(config.auth.api_keys.is_empty());
    }

    #[test]
    fn parses_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [logging]
            level = "debug"
            json = true

            [credentials]
            url = "wss://voice.example.com"
            api_key = "key"
            api_secret = "secret"
            token_ttl_seconds = 90

            [[credentials.tool_servers]]
            label = "support"
            url = "https://tools.example.com/mcp"

            [auth]
            api_keys = ["console-key"]
            "#
        )
        .unwrap();

        let mut config: Config =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        apply_env_overrides(&mut config, env(&[]));

        assert_eq!(config.server.port, 8080);
        assert!(config.logging.json);
        assert_eq!(config.credentials.token_ttl_seconds, 90);
        assert_eq!(config.credentials.tool_servers.len(), 1);
        assert_eq!(config.auth.api_keys, vec!["console-key".to_string()]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nport = ").unwrap();
        let result = load_config(file.path().to_str());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("CONCIERGE_HOST", "0.0.0.0"),
                ("CONCIERGE_PORT", "9000"),
                ("CONCIERGE_LOG_LEVEL", "warn"),
                ("CONCIERGE_LOG_JSON", "1"),
                ("CONCIERGE_LIVEKIT_URL", "wss://voice.example.com"),
                ("CONCIERGE_LIVEKIT_API_KEY", "key"),
                ("CONCIERGE_LIVEKIT_API_SECRET", "secret"),
            ]),
        );

        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
        assert_eq!(config.credentials.url, "wss://voice.example.com");
        assert_eq!(config.credentials.api_key, "key");
        assert_eq!(config.credentials.api_secret, "secret");
    }

    #[test]
    fn unparseable_port_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("CONCIERGE_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn debug_redacts_api_keys() {
        let config = AuthConfig {
            api_keys: vec!["console-key".to_string()],
        };
        assert!(!format!("{:?}", config).contains("console-key"));
    }
}
