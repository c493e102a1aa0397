//! Main chat loop orchestration.
//!
//! Reads one line at a time, validates it, and hands it to the
//! [`RetryingExecutor`]. The next prompt is shown only after the executor
//! reaches a terminal state. Failed requests are reported and the loop keeps
//! going; only `exit` or end of input stop it.

use std::io::{self, Write};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Instrument, debug, info, info_span};

use termchat_core::chat::executor::{Reply, RetryNotice, RetryingExecutor};
use termchat_core::llm::provider::LlmProvider;

use super::input::{InputEvent, LineSource};

/// Prompt shown before every line of input.
pub const PROMPT: &str = "Enter your prompt (or 'exit' to quit): ";

/// Input that ends the session (trimmed, case-insensitive).
pub const EXIT_COMMAND: &str = "exit";

const FAREWELL: &str = "Goodbye!";
const EMPTY_INPUT: &str = "Please enter a prompt.";
const NO_CONTENT: &str = "No response content received.";
const EXIT_HINT: &str = "Type 'exit' or press Ctrl+D to quit.";

/// Presentation settings for the loop.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Label printed before each reply, without the colon.
    pub assistant_name: String,
    /// Show a "thinking..." spinner while a request is in flight.
    pub show_spinner: bool,
}

/// Run the interactive chat loop until `exit` or end of input.
///
/// Everything the user sees goes to `out`. Retry notices are flushed
/// through `input` as soon as they are written, so they show up during the
/// backoff and not at the next prompt. Only write failures on `out` are
/// returned as errors.
pub async fn run_chat_loop<P, I, W>(
    executor: &RetryingExecutor<P>,
    input: &mut I,
    out: &mut W,
    options: &LoopOptions,
) -> io::Result<()>
where
    P: LlmProvider,
    I: LineSource,
    W: Write,
{
    let mut exchanges: u32 = 0;

    loop {
        let line = match input.read_line().await {
            InputEvent::Message(line) => line,
            InputEvent::Eof => {
                writeln!(out, "\n  {}", style(FAREWELL).dim())?;
                break;
            }
            InputEvent::Interrupted => {
                writeln!(out, "\n  {}", style(EXIT_HINT).dim())?;
                continue;
            }
        };

        let text = line.trim();
        if text.eq_ignore_ascii_case(EXIT_COMMAND) {
            writeln!(out, "  {}", style(FAREWELL).dim())?;
            break;
        }
        if text.is_empty() {
            writeln!(out, "  {} {}", style("!").yellow().bold(), EMPTY_INPUT)?;
            continue;
        }

        exchanges += 1;
        let span = info_span!(
            "chat_exchange",
            exchange = exchanges,
            provider = executor.provider().name(),
            model = %executor.model(),
        );

        let spinner = options.show_spinner.then(thinking_spinner);
        let outcome = executor
            .execute_with(text, |notice| {
                let line = describe_notice(notice);
                let mut print = || {
                    let written = writeln!(out, "  {} {line}", style("!").yellow().bold());
                    input.flush_output();
                    written
                };
                let written = match &spinner {
                    Some(spinner) => spinner.suspend(print),
                    None => print(),
                };
                if let Err(e) = written {
                    debug!(error = %e, "Failed to print retry notice");
                }
            })
            .instrument(span)
            .await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        let label = style(format!("{}:", options.assistant_name)).cyan().bold();
        match outcome {
            Ok(Reply::Content(reply)) => {
                writeln!(out, "\n  {label} {}\n", reply.trim())?;
            }
            Ok(Reply::Empty) => {
                writeln!(out, "\n  {label} {}\n", style(NO_CONTENT).dim())?;
            }
            Err(exhausted) => {
                writeln!(out, "\n  {} {exhausted}", style("!").red().bold())?;
                writeln!(
                    out,
                    "  {}\n",
                    style("Type a prompt to try again, or 'exit' to quit.").dim()
                )?;
            }
        }
        input.flush_output();
    }

    input.flush_output();
    info!(exchanges, "Chat session ended");
    Ok(())
}

fn describe_notice(notice: &RetryNotice) -> String {
    match notice {
        RetryNotice::AttemptFailed { attempt, error } => {
            format!("Attempt {attempt} failed: {error}")
        }
        RetryNotice::RetryScheduled { delay, .. } => {
            format!("Retrying in {}ms...", delay.as_millis())
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
