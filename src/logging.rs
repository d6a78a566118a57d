use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info,bitcoincore_rpc=warn,jsonrpc=warn";

/// Install the stderr subscriber. `log` records from the SDK are picked up
/// through the subscriber's `log` bridge.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let use_json = std::env::var("CHANFUND_LOG_JSON")
        .map(|value| value == "1")
        .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
