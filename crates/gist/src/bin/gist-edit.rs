use std::io::Read;

use anyhow::Context;
use clap::Parser;
use gist::{
    openai::OpenAIClient,
    sink::Stdout,
    tracing::{init_tracing_subscriber, LogFormat},
    ModelOptions, Summarizer,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "gist-edit",
    about = "Apply an instruction to text read from stdin",
    after_help = "Examples:\n  gist-edit Translate the following text to French < README.txt\n  gist-edit Fix the bugs in the following python code < buggy.py"
)]
struct Cli {
    /// The instruction, as one or more words
    #[arg(required = true, num_args = 1..)]
    instruction: Vec<String>,

    /// Completion model
    #[arg(short = 'm', long, env = "GIST_MODEL", default_value = ModelOptions::DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens in the response
    #[arg(long, default_value_t = ModelOptions::DEFAULT_MAX_TOKENS)]
    max_tokens: usize,

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

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let options = ModelOptions {
        max_tokens: cli.max_tokens,
        ..ModelOptions::default().with_model(cli.model)
    };
    let openai = OpenAIClient::new(cli.openai_key).with_base_url(cli.base_url);
    let summarizer = Summarizer::new(openai, options, cancel);

    let instruction = cli.instruction.join(" ");
    summarizer
        .summarize_streamed(0, &instruction, &input, &mut Stdout)
        .await
        .context("Edit failed")?;

    Ok(())
}
