//! CORS reverse proxy.
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │                  cors-proxy                  │
//!   Browser       │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ──────────────┼─▶│  http  │──▶│ forward  │──▶│  upstream  │──┼──▶ Backend
//!                 │  │ server │   │ handler  │   │   client   │  │
//!                 │  └────────┘   └────┬─────┘   └────────────┘  │
//!                 │                    │ OPTIONS                  │
//!   ◀─────────────┼────────────────────┘ answered locally         │
//!   + CORS headers│                                              │
//!                 └──────────────────────────────────────────────┘
//! ```

use std::fmt::Display;

use clap::Parser;

use cors_proxy::cli::Cli;
use cors_proxy::net::{listener, tls};
use cors_proxy::observability::logging::init_logging;
use cors_proxy::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let resolved = cli.resolve();
    let debug = match &resolved {
        Ok(config) => config.debug,
        Err(_) => cli.debug.unwrap_or(false),
    };
    init_logging(debug);

    let config = resolved.unwrap_or_else(|e| fatal(e));
    let server = HttpServer::new(config).unwrap_or_else(|e| fatal(e));

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    match server.config().tls.clone() {
        Some(tls_config) => {
            let tls = tls::load_tls_config(&tls_config)
                .await
                .unwrap_or_else(|e| fatal(e));
            let addr = listener::resolve_listen_addr(&server.config().listen)
                .await
                .unwrap_or_else(|e| fatal(e));
            server.run_tls(addr, tls, server_shutdown).await?;
        }
        None => {
            let tcp = listener::bind(&server.config().listen)
                .await
                .unwrap_or_else(|e| fatal(e));
            server.run(tcp, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log `err` and exit with status 1.
fn fatal(err: impl Display) -> ! {
    tracing::error!("{}", err);
    std::process::exit(1)
}
