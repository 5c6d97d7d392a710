//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listen address (host:port)
//!     → listener.rs (resolve + bind)
//!     → tls.rs (optional certificate loading)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;
