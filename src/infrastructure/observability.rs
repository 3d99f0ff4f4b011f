//! Logging setup shared by every binary.

use tracing::Level;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber: `RUST_LOG` directives on top of an INFO floor.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .try_init();
}
