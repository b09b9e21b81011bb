use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Install the global subscriber. `RUST_LOG` wins, otherwise `info`.
///
/// CloudWatch stamps every line itself, so no timestamps here. Calling this
/// twice is harmless; the second install is ignored.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(false)
                    .without_time(),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).without_time())
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("tracing subscriber already installed: {}", e);
    }
}
