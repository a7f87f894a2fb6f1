//! Server configuration module

use serde::{Deserialize, Serialize};

use super::env_parse;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Maximum JSON payload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// Peer addresses whose X-Forwarded-For / X-Real-IP headers are trusted
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
            max_payload_size: default_max_payload_size(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Overlay `SERVER_*` and `TRUSTED_PROXIES` environment variables on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or(base.host),
            port: env_parse("SERVER_PORT").unwrap_or(base.port),
            workers: env_parse("SERVER_WORKERS").unwrap_or(base.workers),
            trusted_proxies: std::env::var("TRUSTED_PROXIES")
                .map(|raw| split_list(&raw))
                .unwrap_or(base.trusted_proxies),
            ..base
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether forwarding headers from this peer may be honoured
    pub fn is_trusted_proxy(&self, peer: &str) -> bool {
        self.trusted_proxies.iter().any(|proxy| proxy == peer)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Enable CORS
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,

    /// Allowed origins; `*` allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow credentials
    #[serde(default)]
    pub allow_credentials: bool,

    /// Max age for preflight cache in seconds
    #[serde(default = "default_max_age")]
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: vec![],
            allow_credentials: false,
            max_age: default_max_age(),
        }
    }
}

impl CorsConfig {
    /// Create a permissive CORS configuration for development
    pub fn development() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            max_age: 3600,
        }
    }

    /// Overlay the comma separated `ALLOWED_ORIGINS` variable on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        match std::env::var("ALLOWED_ORIGINS") {
            Ok(raw) => Self {
                allowed_origins: split_list(&raw),
                ..base
            },
            Err(_) => base,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn default_host() -> String {
    String::from("127.0.0.1")
}

fn default_port() -> u16 {
    8080
}

fn default_max_payload_size() -> usize {
    16 * 1024
}

fn default_cors_enabled() -> bool {
    true
}

fn default_max_age() -> usize {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.trusted_proxies.is_empty());
    }

    #[test]
    fn test_trusted_proxy_lookup() {
        let config = ServerConfig {
            trusted_proxies: split_list("10.0.0.1, 10.0.0.2,,"),
            ..Default::default()
        };
        assert_eq!(config.trusted_proxies.len(), 2);
        assert!(config.is_trusted_proxy("10.0.0.2"));
        assert!(!config.is_trusted_proxy("192.168.1.1"));
    }

    #[test]
    fn test_cors_config_development() {
        let config = CorsConfig::development();
        assert!(config.enabled);
        assert!(config.allows_any_origin());
        assert!(!CorsConfig::default().allows_any_origin());
    }
}
