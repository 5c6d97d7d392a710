//! CORS reverse proxy library.
//!
//! Forwards every request to one upstream and adds the CORS headers a
//! browser needs to let a frontend on another origin read the answers.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
