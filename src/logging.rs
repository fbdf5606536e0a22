use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. `verbosity` comes from repeated `-v` flags;
/// `RUST_LOG` wins when set.
pub(crate) fn init(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        let level = match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("expense_tracker={level}")));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
