//! ConfigReconciler: merges the stored record with the operator's answers.
//!
//! The reconciler asks one question per field, in a fixed order, through a
//! [`LineInput`] implementation injected at construction time.  The stored
//! value is shown as the default, and a blank answer keeps it.
//!
//! ```text
//! API key ─► domain ─► image type ─► [compression level] ─► save to disk
//!         ─► upload to API ─► verbose ─► text plugin
//! ```
//!
//! The compression-level question is only asked for PNG.  Any other image
//! type gets [`DEFAULT_COMPRESSION_LEVEL`](ezshot_core::DEFAULT_COMPRESSION_LEVEL).
//!
//! # Zero compression level
//!
//! A parsed `0` is indistinguishable from "no answer": both keep the current
//! level, and the unset `0` is then replaced by the default.  An operator
//! therefore cannot store level `0` through the prompts.

use ezshot_core::{
    normalize_compression_level, normalize_domain, normalize_image_type, parse_affirmative,
    ConfigurationRecord,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for a single prompt read.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The input stream reached end-of-file.
    #[error("input closed")]
    Closed,
    /// Reading or echoing the prompt failed.
    #[error("prompt I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Line-oriented input source used by the reconciler.
///
/// Implementations display `prompt` together with `default` and return the
/// operator's line with surrounding whitespace removed.  An empty string
/// means "no answer".
#[cfg_attr(test, mockall::automock)]
pub trait LineInput {
    /// Reads one answer.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when no line could be read.  The reconciler
    /// treats that as a blank answer.
    fn read_line(&mut self, prompt: &str, default: &str) -> Result<String, PromptError>;
}

/// Prompt texts, in the order they are asked.
pub mod prompts {
    pub const API_KEY: &str = "Enter your API key";
    pub const DOMAIN: &str = "Enter the base domain";
    pub const IMAGE_TYPE: &str = "Enter image type (PNG, JPEG, GIF)";
    pub const COMPRESSION_LEVEL: &str = "Enter PNG compression level (0-9)";
    pub const SAVE_TO_DISK: &str = "Save screenshot to disk (y/n)";
    pub const UPLOAD_TO_API: &str = "Upload screenshot to API (y/n)";
    pub const VERBOSE: &str = "Enable verbose mode (y/n)";
    pub const TEXT_PLUGIN: &str = "Enable text processing plugin (y/n)";
}

/// The reconcile use case.
pub struct ConfigReconciler<I: LineInput> {
    input: I,
}

impl<I: LineInput> ConfigReconciler<I> {
    /// Creates a reconciler reading answers from `input`.
    pub fn new(input: I) -> Self {
        Self { input }
    }

    /// Returns the input source, e.g. to inspect a scripted session.
    pub fn into_input(self) -> I {
        self.input
    }

    /// Produces the record to persist.
    ///
    /// With `interactive == false` the starting record (`previous`, or the
    /// all-zero record) is returned untouched and no prompt is issued.
    pub fn reconcile(
        &mut self,
        previous: Option<ConfigurationRecord>,
        interactive: bool,
    ) -> ConfigurationRecord {
        let mut record = previous.unwrap_or_default();
        if !interactive {
            debug!("skip mode: passing stored configuration through unchanged");
            return record;
        }

        record.api_key = self.ask_string(prompts::API_KEY, &record.api_key);

        record.domain = normalize_domain(self.ask_string(prompts::DOMAIN, &record.domain));
        if !record.domain.starts_with("https://") {
            warn!(domain = %record.domain, "upload domain does not start with https://");
        }

        record.image_type =
            normalize_image_type(self.ask_string(prompts::IMAGE_TYPE, &record.image_type));

        if record.is_png() {
            record.compression_level = self.ask_compression_level(record.compression_level);
        }
        record.apply_compression_policy();

        record.save_to_disk = self.ask_bool(prompts::SAVE_TO_DISK, record.save_to_disk);
        record.upload_to_api = self.ask_bool(prompts::UPLOAD_TO_API, record.upload_to_api);
        record.verbose = self.ask_bool(prompts::VERBOSE, record.verbose);
        record.text_plugin_enabled =
            self.ask_bool(prompts::TEXT_PLUGIN, record.text_plugin_enabled);

        record
    }

    /// Reads one answer; `None` for blank input or a failed read.
    fn answer(&mut self, prompt: &str, default: &str) -> Option<String> {
        match self.input.read_line(prompt, default) {
            Ok(line) => {
                let line = line.trim();
                (!line.is_empty()).then(|| line.to_string())
            }
            Err(e) => {
                warn!(prompt, error = %e, "prompt failed; keeping current value");
                None
            }
        }
    }

    fn ask_string(&mut self, prompt: &str, current: &str) -> String {
        self.answer(prompt, current)
            .unwrap_or_else(|| current.to_string())
    }

    /// Only the leading integer of the answer counts (`"7abc"` reads as 7).
    /// Answers with no leading integer and `0` both keep `current`.  Range
    /// checking is left to [`ConfigurationRecord::apply_compression_policy`].
    fn ask_compression_level(&mut self, current: i32) -> i32 {
        let answer = self.answer(prompts::COMPRESSION_LEVEL, &current.to_string());
        match answer.as_deref().map(leading_integer) {
            Some(Some(level)) if level != 0 => level,
            Some(None) => {
                debug!("compression level is not an integer; keeping current value");
                current
            }
            _ => current,
        }
    }

    fn ask_bool(&mut self, prompt: &str, current: bool) -> bool {
        let default = if current { "y" } else { "n" };
        self.answer(prompt, default)
            .map_or(current, |answer| parse_affirmative(&answer))
    }
}

/// Parses an optionally signed run of digits at the start of `text`.
/// Values that overflow `i32` saturate, which the range check then replaces.
fn leading_integer(text: &str) -> Option<i32> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = rest[..digits].bytes().fold(0i32, |acc, d| {
        acc.saturating_mul(10).saturating_add(i32::from(d - b'0'))
    });
    Some(if negative { -value } else { value })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
