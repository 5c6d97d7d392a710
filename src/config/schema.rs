//! Configuration schema definitions.
//!
//! Field names mirror the command line flags so a TOML file and the CLI
//! describe the same settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream `host:port` that every request is forwarded to.
    pub target: String,

    /// Local bind address (`host:port`).
    pub listen: String,

    /// Scheme used to reach the target (`http` or `https`).
    pub protocol: String,

    /// Host header sent upstream. Empty keeps the target authority.
    pub host: String,

    /// Fixed CORS origin. Empty means the origin is taken from each request.
    pub origin: String,

    /// Emit the default `Access-Control-Allow-Methods` header.
    pub methods: bool,

    /// Verbose request and byte-count logging.
    pub debug: bool,

    /// Serve the listener over TLS.
    pub tls: Option<TlsConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            target: "localhost:8080".to_string(),
            listen: "localhost:8181".to_string(),
            protocol: "http".to_string(),
            host: "localhost:3000".to_string(),
            origin: "http://localhost:3000".to_string(),
            methods: true,
            debug: false,
            tls: None,
        }
    }
}

impl ProxyConfig {
    /// Host header override, if one is configured.
    pub fn host_override(&self) -> Option<&str> {
        Some(self.host.as_str()).filter(|h| !h.is_empty())
    }

    /// Fixed CORS origin, if one is configured.
    pub fn fixed_origin(&self) -> Option<&str> {
        Some(self.origin.as_str()).filter(|o| !o.is_empty())
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_flag_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.target, "localhost:8080");
        assert_eq!(config.listen, "localhost:8181");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.host_override(), Some("localhost:3000"));
        assert_eq!(config.fixed_origin(), Some("http://localhost:3000"));
        assert!(config.methods);
        assert!(!config.debug);
        assert!(config.tls.is_none());
    }

    #[test]
    fn empty_strings_disable_overrides() {
        let config = ProxyConfig {
            host: String::new(),
            origin: String::new(),
            ..ProxyConfig::default()
        };
        assert_eq!(config.host_override(), None);
        assert_eq!(config.fixed_origin(), None);
    }

    #[test]
    fn protocol_parses_only_known_schemes() {
        assert_eq!("http".parse::<Protocol>(), Ok(Protocol::Http));
        assert_eq!("https".parse::<Protocol>(), Ok(Protocol::Https));
        assert_eq!("HTTP".parse::<Protocol>(), Err("HTTP".to_string()));
        assert_eq!("ftp".parse::<Protocol>(), Err("ftp".to_string()));
    }
}
