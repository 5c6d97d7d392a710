//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (ProxyConfig::default)
//!     → loader.rs (optional TOML file)
//!     → cli overrides (command line wins)
//!     → validation.rs (address + protocol checks, target normalization)
//!     → ProxyConfig + UpstreamTarget (immutable)
//!     → shared via Arc with the forwarding handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; nothing writes to it at runtime
//! - All fields have defaults to allow an empty command line
//! - Validation separates syntactic (serde, clap) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{Protocol, ProxyConfig, TlsConfig};
pub use validation::{UpstreamTarget, ValidationError};
