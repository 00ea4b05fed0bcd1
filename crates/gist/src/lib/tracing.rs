use clap::ValueEnum;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Shape of the diagnostic lines written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Bunyan-style JSON, one object per line.
    Json,
}

/// Installs the global subscriber: `RUST_LOG` filtering (default `warn`),
/// error reporting to Sentry and log lines on stderr. Stdout stays reserved
/// for summaries.
pub fn init_tracing_subscriber(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let output = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => JsonStorageLayer
            .and_then(BunyanFormattingLayer::new(
                env!("CARGO_PKG_NAME").into(),
                std::io::stderr,
            ))
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer())
        .with(output)
        .try_init()?;

    Ok(())
}
