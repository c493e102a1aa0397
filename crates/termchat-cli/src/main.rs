//! termchat entry point.
//!
//! Binary name: `termchat`
//!
//! Parses CLI arguments, initializes tracing, loads configuration and
//! credentials, then runs the interactive chat loop. Configuration and
//! credential problems abort here with a non-zero exit before any prompt.

mod cli;

use std::env::VarError;
use std::io::{IsTerminal, Write};

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use termchat_core::chat::executor::RetryingExecutor;
use termchat_core::llm::box_provider::BoxLlmProvider;
use termchat_infra::config::load_chat_config;
use termchat_infra::llm::create_provider;
use termchat_infra::secret::env::EnvCredentialProvider;
use termchat_infra::secret::load_dotenv;
use termchat_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use termchat_types::config::ChatConfig;

use cli::chat::banner::print_welcome_banner;
use cli::chat::input::{ChatInput, LineSource, StdinLines};
use cli::chat::loop_runner::{LoopOptions, PROMPT, run_chat_loop};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = filter_for_verbosity(cli.verbose, cli.quiet);
    if let Err(e) = init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    // Shell completions don't need credentials
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "termchat", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    load_dotenv();

    let session = start_session(&cli, &EnvCredentialProvider::new()).await?;
    let interactive = std::io::stdin().is_terminal();

    if interactive {
        let (mut input, mut writer) = ChatInput::new(PROMPT.to_string())
            .context("failed to initialize line editor")?;
        chat(&session, &mut input, &mut writer, true).await
    } else {
        let mut input = StdinLines::new(PROMPT.to_string());
        chat(&session, &mut input, &mut std::io::stdout(), false).await
    }
}

/// Everything needed to chat, resolved before the terminal is touched.
struct Session {
    config: ChatConfig,
    executor: RetryingExecutor<BoxLlmProvider>,
}

/// Resolve config and credentials and build the provider. Any failure here
/// ends the program before a banner or prompt is shown.
async fn start_session<F>(
    cli: &Cli,
    credentials: &EnvCredentialProvider<F>,
) -> anyhow::Result<Session>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let config = resolve_config(cli).await?;
    let credentials = credentials.load()?;
    let provider =
        create_provider(&config, credentials).context("failed to create LLM provider")?;
    tracing::info!(
        provider = provider.name(),
        model = %config.model,
        max_retries = config.retry.max_retries,
        initial_delay_ms = config.retry.initial_delay_ms,
        "Starting chat session"
    );

    let executor = RetryingExecutor::new(provider, config.model.clone(), config.retry);
    Ok(Session { config, executor })
}

/// Show the banner (interactive only) and run the prompt loop.
async fn chat<I, W>(
    session: &Session,
    input: &mut I,
    out: &mut W,
    interactive: bool,
) -> anyhow::Result<()>
where
    I: LineSource,
    W: Write,
{
    let config = &session.config;
    let options = LoopOptions {
        assistant_name: config.assistant_name.clone(),
        show_spinner: interactive && console::Term::stderr().is_term(),
    };

    if interactive {
        print_welcome_banner(out, &config.assistant_name, &config.model, &config.base_url)?;
    }
    run_chat_loop(&session.executor, input, out, &options).await?;
    Ok(())
}

/// Config file (or defaults), then flag/env overrides, then validation.
async fn resolve_config(cli: &Cli) -> anyhow::Result<ChatConfig> {
    let config = load_chat_config(cli.config.as_deref())
        .await?
        .apply(cli.overrides());
    config.validate()?;
    Ok(config)
}
