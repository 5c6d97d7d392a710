//! Observability subsystem.
//!
//! Structured logging through `tracing`; the proxy exports no metrics.

pub mod logging;
