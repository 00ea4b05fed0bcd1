use anyhow::Context;
use clap::Parser;
use gist::{
    openai::OpenAIClient,
    sink::StderrProgress,
    tracing::{init_tracing_subscriber, LogFormat},
    ModelOptions, PipelineBuilder, Selection,
};
use gist_sources::{extract_or_placeholder, Extractor, Target};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "gist",
    about = "Summarize URLs or files, including YouTube videos via their transcripts"
)]
struct Cli {
    /// URL or file to summarize
    target: String,

    /// The maximum size (in characters) to summarize at once
    #[arg(short = 'b', long, default_value_t = PipelineBuilder::DEFAULT_MAX_SIZE)]
    max_size: usize,

    /// Include an executive summary
    #[arg(short = 'x', long)]
    executive_summary: bool,

    /// Only output the executive summary
    #[arg(short = 'X', long)]
    executive_summary_only: bool,

    /// Include a TL;DR
    #[arg(short = 't', long)]
    tldr: bool,

    /// Only output a TL;DR
    #[arg(short = 'T', long)]
    tldr_only: bool,

    /// Don't output text as it's created
    #[arg(short = 'S', long)]
    no_stream: bool,

    /// Show percentage progress on stderr
    #[arg(short = 'p', long)]
    progress: bool,

    /// Completion model
    #[arg(short = 'm', long, env = "GIST_MODEL", default_value = ModelOptions::DEFAULT_MODEL)]
    model: String,

    /// Language of the document, used for sentence splitting and transcripts
    #[arg(long, env = "GIST_LANGUAGE", default_value = "en")]
    language: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OpenAIClient::BASE_URL)]
    base_url: String,

    #[arg(long, env = "GIST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber(cli.log_format)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping");
                cancel.cancel();
            }
        }
    });

    let openai = OpenAIClient::new(cli.openai_key).with_base_url(cli.base_url);
    let selection = Selection::from_flags(
        cli.executive_summary,
        cli.executive_summary_only,
        cli.tldr,
        cli.tldr_only,
    );

    let mut builder = PipelineBuilder::new()
        .completer(openai)
        .max_size(cli.max_size)
        .selection(selection)
        .stream(!cli.no_stream)
        .language(&cli.language)
        .model_options(ModelOptions::default().with_model(cli.model))
        .cancellation(cancel.clone());
    if cli.progress {
        builder = builder.progress(StderrProgress);
    }
    let mut pipeline = builder.build().context("Invalid configuration")?;

    let target = Target::parse(&cli.target);
    tracing::info!(%target, "Extracting text");
    let extractor = Extractor::new(cli.language);

    let document = tokio::select! {
        biased;
        _ = cancel.cancelled() => anyhow::bail!("Interrupted before the document was read"),
        document = extract_or_placeholder(&extractor, &target) => document,
    };

    let digest = pipeline
        .run(document)
        .await
        .with_context(|| format!("Failed to summarize {target}"))?;

    tracing::info!(warnings = digest.warnings.len(), "Done");

    Ok(())
}
