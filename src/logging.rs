//! Structured logging setup for the binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact stderr subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("ctxpack=debug,warn")
            } else {
                EnvFilter::try_new("ctxpack=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))
}
