//! Interactive console session
//!
//! Reads one line at a time, runs it through the [`Pipeline`] and prints the
//! reply. A failed turn is reported and the session carries on.

use crate::pipeline::Pipeline;
use std::io::{self, BufRead, Write};
use tracing::{debug, error};

/// Any line containing this token (case-insensitive) ends the session
pub const EXIT_SENTINEL: &str = "*quit";

pub const PROMPT: &str = "-> ";
pub const REPLY_MARKER: &str = "\t- ";
pub const RETRY_HINT: &str = "...Please try again!";

const BANNER: [&str; 3] = [
    "-------- Welcome to the Höga Kustens Gårdsmusteri Chat Bot --------",
    "|        What do you want to know? (write '*quit' to exit)        |",
    "-------------------------------------------------------------------",
];

pub fn is_exit(line: &str) -> bool {
    line.to_lowercase().contains(EXIT_SENTINEL)
}

/// Counters reported when the session ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    pub failures: usize,
}

pub struct Session<R, W> {
    pipeline: Pipeline,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(pipeline: Pipeline, input: R, output: W) -> Self {
        Self {
            pipeline,
            input,
            output,
        }
    }

    /// Run until the exit sentinel or end of input. Only console I/O errors
    /// end the session early.
    pub async fn run(mut self) -> io::Result<SessionSummary> {
        for line in BANNER {
            writeln!(self.output, "{}", line)?;
        }

        let mut summary = SessionSummary::default();
        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                debug!("input closed");
                break;
            }

            let line = line.trim_end_matches(['\r', '\n']).to_lowercase();
            if is_exit(&line) {
                break;
            }

            summary.turns += 1;
            match self.pipeline.run_turn(&line).await {
                Ok(turn) => {
                    writeln!(self.output, "{}{}", REPLY_MARKER, turn.reply)?;
                }
                Err(e) => {
                    summary.failures += 1;
                    error!(stage = %e.stage, error = %e.source, "turn failed");
                    writeln!(self.output, "* {}", e)?;
                    writeln!(self.output, "{}", RETRY_HINT)?;
                }
            }
            self.output.flush()?;
        }

        debug!(turns = summary.turns, failures = summary.failures, "session ended");
        Ok(summary)
    }
}
