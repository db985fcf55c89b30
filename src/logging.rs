use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Color codes only go to a terminal, and only when color is wanted
pub fn ansi_enabled(color: bool, stderr_is_terminal: bool) -> bool {
    color && stderr_is_terminal
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `default_filter` when it is set and valid.
pub fn init_tracing(default_filter: &str, color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi_enabled(color, std::io::stderr().is_terminal()))
                .with_target(true)
                .without_time()
                .compact(),
        )
        .try_init();
}
