//! Command line arguments.
//!
//! Every flag is optional. Values given here override the configuration
//! file, which in turn overrides the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ProxyConfig, TlsConfig};

#[derive(Parser, Debug)]
#[command(name = "cors-proxy")]
#[command(about = "Reverse proxy that adds CORS headers to a single upstream", long_about = None)]
pub struct Cli {
    /// host:port to proxy requests to [default: localhost:8080]
    #[arg(long)]
    pub target: Option<String>,

    /// host:port to listen on [default: localhost:8181]
    #[arg(long)]
    pub listen: Option<String>,

    /// Protocol used by the target, http or https [default: http]
    #[arg(long)]
    pub protocol: Option<String>,

    /// Host header to be used for the proxy request, empty to keep the target's [default: localhost:3000]
    #[arg(long)]
    pub host: Option<String>,

    /// Access-Control-Allow-Origin value, empty to use each request's Origin [default: http://localhost:3000]
    #[arg(long)]
    pub origin: Option<String>,

    /// Enable / disable default access control methods [default: true]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub methods: Option<bool>,

    /// Enable / disable debug messages [default: false]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub debug: Option<bool>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// PEM certificate, serves the listener over TLS together with --tls-key
    #[arg(long, requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key for --tls-cert
    #[arg(long, requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Cli {
    /// Build the effective configuration: defaults, then the file, then flags.
    pub fn resolve(&self) -> Result<ProxyConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => crate::config::loader::load_config(path)?,
            None => ProxyConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Overlay the flags that were given on the command line.
    pub fn apply(&self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(listen) = &self.listen {
            config.listen = listen.clone();
        }
        if let Some(protocol) = &self.protocol {
            config.protocol = protocol.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(methods) = self.methods {
            config.methods = methods;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let (Some(cert), Some(key)) = (&self.tls_cert, &self.tls_key) {
            config.tls = Some(TlsConfig {
                cert_path: cert.display().to_string(),
                key_path: key.display().to_string(),
            });
        }
        config
    }
}
