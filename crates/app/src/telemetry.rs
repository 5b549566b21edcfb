use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_LEVEL: &str = "info";
const JSON_ENV: &str = "QUIZ_LOG_JSON";

/// `RUST_LOG` wins over the default level; `QUIZ_LOG_JSON=1` switches to JSON lines.
pub(crate) fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let json = std::env::var(JSON_ENV).is_ok_and(|value| value == "1");

    let builder = fmt().with_env_filter(filter).with_target(false);

    if json {
        builder
            .json()
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| err.to_string())?;
    } else {
        builder
            .compact()
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| err.to_string())?;
    }

    Ok(())
}
