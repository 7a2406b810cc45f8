use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the binaries.
///
/// `RUST_LOG` overrides the default filter of `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gridpath=info"));

    // A second call in the same process keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
