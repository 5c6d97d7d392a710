//! Configuration validation.
//!
//! # Responsibilities
//! - Check `host:port` shape of the target and listen addresses
//! - Default an empty target host to `localhost`
//! - Check the upstream protocol
//! - Check that a TLS listener names both its files
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - No port-range or URL checks; the OS and the client report those
//! - Runs before the forwarding handler is registered

use crate::config::schema::{Protocol, ProxyConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} {value:?} is incorrect, you must use a colon (:) to separate the host and port")]
    MissingPort { field: &'static str, value: String },

    #[error("protocol can only be \"http\" or \"https\", not {0:?}")]
    Protocol(String),

    #[error("tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),
}

/// Where requests are sent, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub protocol: Protocol,
    /// `host:port` used in the destination URL.
    pub authority: String,
}

/// Validate the configuration and derive the upstream target from it.
pub fn validate_config(config: &ProxyConfig) -> Result<UpstreamTarget, Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [("target", &config.target), ("listen", &config.listen)] {
        if !value.contains(':') {
            errors.push(ValidationError::MissingPort {
                field,
                value: value.clone(),
            });
        }
    }

    let protocol = match config.protocol.parse::<Protocol>() {
        Ok(p) => Some(p),
        Err(other) => {
            errors.push(ValidationError::Protocol(other));
            None
        }
    };

    if let Some(tls) = &config.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    match protocol {
        Some(protocol) if errors.is_empty() => Ok(UpstreamTarget {
            protocol,
            authority: normalize_target(&config.target),
        }),
        _ => Err(errors),
    }
}

/// Fill in `localhost` when the target only names a port (`:8080`).
pub fn normalize_target(target: &str) -> String {
    match target.split_once(':') {
        Some(("", port)) => {
            tracing::warn!(
                port = %port,
                "No target host set, using localhost:{}",
                port
            );
            format!("localhost:{}", port)
        }
        _ => target.to_string(),
    }
}
