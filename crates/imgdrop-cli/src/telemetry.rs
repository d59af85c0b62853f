use imgdrop_core::LogFormat;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "imgdrop=info";

/// Install the global tracing subscriber. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match format {
        LogFormat::Compact => {
            let console_fmt = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(Format::default().compact().with_target(false));
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .init();
        }
        LogFormat::Json => {
            let json_fmt = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json();
            tracing_subscriber::registry()
                .with(filter)
                .with(json_fmt)
                .init();
        }
    }
}
