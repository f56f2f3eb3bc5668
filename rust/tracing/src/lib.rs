//! Minimal `tracing-subscriber` setup shared by tests and embedding
//! applications. There is no service boundary in this workspace, so there
//! is nothing here beyond a local formatter layer driven by `RUST_LOG` —
//! no OTLP exporters, no gRPC trace propagation.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Installs a global `tracing` subscriber that writes formatted events to
/// stderr, filtered by `RUST_LOG` (default `info`). Safe to call more than
/// once; only the first call takes effect.
pub fn init_tracing_subscriber() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        // Ignore the error: a subscriber may already be installed by the
        // caller's own test harness.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
