//! Scripted line input for tests and non-terminal callers.
//!
//! [`ScriptedLineInput`] replaces the terminal with a queue of canned
//! answers.  Every question it is asked is recorded, together with the
//! default that was offered, so tests can check both what the reconciler
//! asked and what it did with the answers.
//!
//! # Usage in tests
//!
//! ```
//! use ezshot_config::application::reconcile::{prompts, ConfigReconciler};
//! use ezshot_config::infrastructure::prompt::mock::ScriptedLineInput;
//!
//! let mut reconciler = ConfigReconciler::new(ScriptedLineInput::new(["my-key"]));
//! let record = reconciler.reconcile(None, true);
//!
//! assert_eq!(record.api_key, "my-key");
//! let input = reconciler.into_input();
//! assert_eq!(input.asked()[0].0, prompts::API_KEY);
//! ```
//!
//! Once the script is exhausted every further read reports
//! [`PromptError::Closed`], which the reconciler treats as a blank answer.

use std::collections::VecDeque;
use std::io;

use crate::application::reconcile::{LineInput, PromptError};

/// One scripted step: an answer, or a simulated read failure.
#[derive(Debug, Clone)]
enum Step {
    Answer(String),
    Fail,
}

/// A line input that replays answers instead of reading a terminal.
#[derive(Debug, Default)]
pub struct ScriptedLineInput {
    steps: VecDeque<Step>,
    asked: Vec<(String, String)>,
}

impl ScriptedLineInput {
    /// Creates a script that answers the first questions with `answers`.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: answers
                .into_iter()
                .map(|a| Step::Answer(a.into()))
                .collect(),
            asked: Vec::new(),
        }
    }

    /// Appends an answer to the script.
    pub fn push_answer(&mut self, answer: impl Into<String>) -> &mut Self {
        self.steps.push_back(Step::Answer(answer.into()));
        self
    }

    /// Appends a read failure to the script.
    pub fn push_failure(&mut self) -> &mut Self {
        self.steps.push_back(Step::Fail);
        self
    }

    /// Every `(prompt, default)` pair asked so far, in order.
    pub fn asked(&self) -> &[(String, String)] {
        &self.asked
    }

    /// The prompts asked so far, in order.
    pub fn prompts(&self) -> impl Iterator<Item = &str> {
        self.asked.iter().map(|(prompt, _)| prompt.as_str())
    }

    /// Number of scripted steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl LineInput for ScriptedLineInput {
    fn read_line(&mut self, prompt: &str, default: &str) -> Result<String, PromptError> {
        self.asked.push((prompt.to_string(), default.to_string()));
        match self.steps.pop_front() {
            Some(Step::Answer(answer)) => Ok(answer),
            Some(Step::Fail) => Err(PromptError::Io(io::Error::other("scripted read failure"))),
            None => Err(PromptError::Closed),
        }
    }
}
