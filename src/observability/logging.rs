//! Structured logging.
//!
//! Events go to stderr. `RUST_LOG` takes precedence over the level derived
//! from the `debug` setting.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "cors_proxy=debug,tower_http=debug"
    } else {
        "cors_proxy=info,tower_http=warn"
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
