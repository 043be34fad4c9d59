use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// JSON logs filtered by `RUST_LOG`. `SIMDATA_LOG_FORMAT=pretty` switches to human-readable output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let pretty = std::env::var("SIMDATA_LOG_FORMAT").map(|v| v == "pretty").unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);
    if pretty {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}
