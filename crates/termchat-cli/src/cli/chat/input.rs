//! Line input for the chat loop.
//!
//! On a terminal, `ChatInput` wraps `rustyline_async::Readline` for line
//! editing, history, EOF (Ctrl+D) and interrupt (Ctrl+C). When stdin is a
//! pipe or file, `StdinLines` reads buffered lines and prints the prompt
//! itself.

use std::future::Future;
use std::io::Write;

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Events produced by an input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// User submitted a line (untrimmed).
    Message(String),
    /// End of input (Ctrl+D or closed stdin).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

/// Anything the chat loop can pull lines from.
pub trait LineSource {
    /// Show the prompt and wait for the next event.
    fn read_line(&mut self) -> impl Future<Output = InputEvent>;

    /// Push output queued behind the prompt to the terminal now, without
    /// waiting for the next `read_line`.
    fn flush_output(&mut self) {}
}

/// Async line editor for interactive terminals.
pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Create a new chat input handler with the given prompt.
    ///
    /// Returns the input handler and a `SharedWriter` that prints output
    /// without clobbering the prompt line.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }
}

impl LineSource for ChatInput {
    async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                if !line.trim().is_empty() {
                    self.rl.add_history_entry(line.clone());
                }
                InputEvent::Message(line)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                tracing::debug!(error = %e, "Readline failed, treating as end of input");
                InputEvent::Eof
            }
        }
    }

    /// `SharedWriter` only queues lines; they reach the terminal when
    /// `Readline` flushes them.
    fn flush_output(&mut self) {
        if let Err(e) = self.rl.flush() {
            tracing::debug!(error = %e, "Failed to flush readline output");
        }
    }
}

/// Buffered line reader for non-interactive stdin.
pub struct StdinLines {
    prompt: String,
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLines {
    pub fn new(prompt: String) -> Self {
        Self {
            prompt,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl LineSource for StdinLines {
    async fn read_line(&mut self) -> InputEvent {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{}", self.prompt);
        let _ = stdout.flush();

        match self.lines.next_line().await {
            Ok(Some(line)) => InputEvent::Message(line),
            Ok(None) => InputEvent::Eof,
            Err(e) => {
                tracing::debug!(error = %e, "Reading stdin failed, treating as end of input");
                InputEvent::Eof
            }
        }
    }
}
