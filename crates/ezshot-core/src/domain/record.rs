//! The persisted configuration record and the rules that keep it valid.
//!
//! A [`ConfigurationRecord`] is the complete set of settings the screenshot
//! uploader reads on every run.  It is stored on disk as a flat JSON object:
//!
//! ```json
//! {
//!   "api_key": "abc123",
//!   "domain": "https://cdn.kuuichi.xyz/",
//!   "image_type": "png",
//!   "compression_level": 6,
//!   "save_to_disk": false,
//!   "upload_to_api": true,
//!   "verbose": false,
//!   "text_plugin_enabled": false
//! }
//! ```
//!
//! # Fields owned by other tools
//!
//! The launcher and the plugin loader keep their own keys (`screenshot_tool`,
//! `plugins`, ...) in the same file.  Keys this record does not recognise are
//! collected into [`ConfigurationRecord::extra`] on load and written back
//! unchanged on save.
//!
//! # Legacy `file_type`
//!
//! Older files name the image format `file_type`.  When `image_type` is
//! absent, a string `file_type` is read into `image_type` and the legacy key
//! is dropped; saving always writes `image_type`.  When both keys are present
//! `image_type` wins and `file_type` is kept as an unrecognised key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Upload host used when neither the stored record nor the operator supplies one.
pub const DEFAULT_DOMAIN: &str = "https://cdn.kuuichi.xyz/";

/// Image format used when neither the stored record nor the operator supplies one.
pub const DEFAULT_IMAGE_TYPE: &str = "png";

/// PNG compression level used for unset, out-of-range, and non-PNG records.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

/// Highest accepted PNG compression level.
pub const MAX_COMPRESSION_LEVEL: i32 = 9;

const LEGACY_IMAGE_TYPE_KEY: &str = "file_type";

/// Persisted settings for the screenshot uploader.
///
/// `Default` yields the all-zero record (empty strings, `0`, `false`) that a
/// first run starts from.  The built-in defaults are applied by the
/// reconciler, not by `Default`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct ConfigurationRecord {
    /// Opaque upload credential.  Never validated.
    pub api_key: String,
    /// Base URL that uploaded image names are appended to.
    pub domain: String,
    /// Image format name, compared case-insensitively.
    pub image_type: String,
    /// PNG compression level, `0..=9`.
    pub compression_level: i32,
    pub save_to_disk: bool,
    pub upload_to_api: bool,
    pub verbose: bool,
    pub text_plugin_enabled: bool,
    /// Top-level keys written by other tools, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// On-disk shape accepted by the decoder.
///
/// Every field is optional so that partial files decode into zero values.
#[derive(Deserialize)]
struct StoredRecord {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    image_type: Option<String>,
    /// Read wide so that an oversized level is repaired instead of failing
    /// the whole file.
    #[serde(default)]
    compression_level: i64,
    #[serde(default)]
    save_to_disk: bool,
    #[serde(default)]
    upload_to_api: bool,
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    text_plugin_enabled: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<StoredRecord> for ConfigurationRecord {
    fn from(stored: StoredRecord) -> Self {
        let mut extra = stored.extra;
        let image_type = match stored.image_type {
            Some(image_type) => image_type,
            None => match extra.remove(LEGACY_IMAGE_TYPE_KEY) {
                Some(Value::String(legacy)) => legacy,
                Some(other) => {
                    // Not a string: leave it for whoever wrote it.
                    extra.insert(LEGACY_IMAGE_TYPE_KEY.to_string(), other);
                    String::new()
                }
                None => String::new(),
            },
        };

        Self {
            api_key: stored.api_key,
            domain: stored.domain,
            image_type,
            compression_level: narrow_compression_level(stored.compression_level),
            save_to_disk: stored.save_to_disk,
            upload_to_api: stored.upload_to_api,
            verbose: stored.verbose,
            text_plugin_enabled: stored.text_plugin_enabled,
            extra,
        }
    }
}

/// Levels outside `i32` become [`DEFAULT_COMPRESSION_LEVEL`]; anything
/// that fits is kept for [`normalize_compression_level`] to judge.
fn narrow_compression_level(level: i64) -> i32 {
    i32::try_from(level).unwrap_or_else(|_| {
        debug!(level, "stored compression level out of range; using default");
        DEFAULT_COMPRESSION_LEVEL
    })
}

impl ConfigurationRecord {
    /// Returns `true` when the record's image type denotes PNG.
    pub fn is_png(&self) -> bool {
        is_png(&self.image_type)
    }

    /// Applies the PNG-only compression policy.
    ///
    /// Non-PNG records always carry [`DEFAULT_COMPRESSION_LEVEL`]; PNG records
    /// have their level passed through [`normalize_compression_level`].
    pub fn apply_compression_policy(&mut self) {
        self.compression_level = if self.is_png() {
            normalize_compression_level(self.compression_level)
        } else {
            if self.compression_level != DEFAULT_COMPRESSION_LEVEL {
                debug!(
                    image_type = %self.image_type,
                    level = self.compression_level,
                    "compression level reset for non-PNG image type"
                );
            }
            DEFAULT_COMPRESSION_LEVEL
        };
    }

    /// The API key with all but its last four characters replaced by `*`.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return "(not set)".to_string();
        }
        let visible = chars.len().saturating_sub(4);
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { *c })
            .collect()
    }
}

impl fmt::Display for ConfigurationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn yes_no(flag: bool) -> &'static str {
            if flag {
                "yes"
            } else {
                "no"
            }
        }

        writeln!(f, "API Key: {}", self.masked_api_key())?;
        writeln!(f, "Domain: {}", self.domain)?;
        writeln!(f, "Image Type: {}", self.image_type)?;
        writeln!(f, "Compression Level: {}", self.compression_level)?;
        writeln!(f, "Save To Disk: {}", yes_no(self.save_to_disk))?;
        writeln!(f, "Upload To API: {}", yes_no(self.upload_to_api))?;
        writeln!(f, "Verbose: {}", yes_no(self.verbose))?;
        write!(f, "Text Plugin Enabled: {}", yes_no(self.text_plugin_enabled))
    }
}

// ── Field rules ───────────────────────────────────────────────────────────────

/// Substitutes [`DEFAULT_DOMAIN`] for a blank domain.
pub fn normalize_domain(domain: String) -> String {
    if domain.trim().is_empty() {
        DEFAULT_DOMAIN.to_string()
    } else {
        domain
    }
}

/// Substitutes [`DEFAULT_IMAGE_TYPE`] for a blank image type.
pub fn normalize_image_type(image_type: String) -> String {
    if image_type.trim().is_empty() {
        DEFAULT_IMAGE_TYPE.to_string()
    } else {
        image_type
    }
}

/// Keeps `1..=9` and replaces everything else with [`DEFAULT_COMPRESSION_LEVEL`].
///
/// `0` is the "unset" sentinel, so it is replaced as well.
pub fn normalize_compression_level(level: i32) -> i32 {
    if (1..=MAX_COMPRESSION_LEVEL).contains(&level) {
        level
    } else {
        debug!(level, "compression level replaced by default");
        DEFAULT_COMPRESSION_LEVEL
    }
}

/// Case-insensitive PNG check.
pub fn is_png(image_type: &str) -> bool {
    image_type.trim().eq_ignore_ascii_case("png")
}

/// `y` (any case) is the only affirmative answer.
pub fn parse_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
