//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Validate the configuration before any handler exists
//! - Create the Axum Router with the catch-all forwarding handler
//! - Serve plain HTTP or, when configured, HTTPS
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{validation::validate_config, ConfigError, ProxyConfig, UpstreamTarget};
use crate::http::client::{Inbound, UpstreamClients};
use crate::http::forward::proxy_handler;

/// How long in-flight TLS connections get to finish after shutdown.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub upstream: Arc<UpstreamTarget>,
    pub clients: UpstreamClients,
    pub inbound: Inbound,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Validate `config` and prepare the shared state.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        let upstream = validate_config(&config).map_err(ConfigError::Validation)?;
        let clients = UpstreamClients::new()?;

        tracing::info!(
            listen = %config.listen,
            upstream = %format!("{}://{}", upstream.protocol, upstream.authority),
            host = config.host_override().unwrap_or("<target>"),
            origin = config.fixed_origin().unwrap_or("<per request>"),
            methods = config.methods,
            "{} --> {}",
            config.listen,
            upstream.authority
        );

        Ok(Self {
            state: AppState {
                config: Arc::new(config),
                upstream: Arc::new(upstream),
                clients,
                inbound: Inbound::Plain,
            },
        })
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }

    /// Router for requests arriving over plain HTTP.
    pub fn router(&self) -> Router {
        Self::build_router(self.state.clone())
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    ///
    /// Requests served here use the upstream client that skips certificate
    /// verification.
    pub async fn run_tls(
        mut self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::warn!(
            address = %addr,
            "HTTPS server starting; upstream certificates will NOT be verified for requests received over TLS"
        );

        self.state.inbound = Inbound::Tls;
        let app = Self::build_router(self.state);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
