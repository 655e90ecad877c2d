//! Terminal line input for the reconciler.
//!
//! [`TerminalLineInput`] prints `question [default]: `, flushes, and reads a
//! single line.  It is generic over the reader and writer so the exact bytes
//! exchanged with the operator can be checked in tests with in-memory
//! buffers; [`TerminalLineInput::stdio`] binds it to the process terminal.
//!
//! The scripted replacement used by integration tests lives in [`mock`].

pub mod mock;

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::application::reconcile::{LineInput, PromptError};

/// Reads answers from `reader`, echoing prompts to `writer`.
pub struct TerminalLineInput<R, W> {
    reader: R,
    writer: W,
}

impl TerminalLineInput<StdinLock<'static>, Stdout> {
    /// Binds to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalLineInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consumes the adapter and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> LineInput for TerminalLineInput<R, W> {
    fn read_line(&mut self, prompt: &str, default: &str) -> Result<String, PromptError> {
        write!(self.writer, "{prompt} [{default}]: ")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            // Keep the terminal tidy when input ends mid-prompt.
            writeln!(self.writer)?;
            return Err(PromptError::Closed);
        }
        Ok(line.trim().to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
