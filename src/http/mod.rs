//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, trace layer)
//!     → forward.rs (preflight or forward)
//!         → cors.rs (origin, Access-Control-* headers)
//!         → client.rs (destination uri, outbound clients)
//!     → response.rs (hop-by-hop filtering, body streaming, 500 mapping)
//!     → Send to client
//! ```

pub mod client;
pub mod cors;
pub mod forward;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
