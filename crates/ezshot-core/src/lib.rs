//! # ezshot-core
//!
//! Shared library for e-zshot containing the persisted configuration record
//! and the rules that keep it valid.
//!
//! This crate performs no file or terminal I/O.  Loading, prompting, and
//! saving live in `ezshot-config`, which builds on the types defined here.
//!
//! # Architecture overview
//!
//! e-zshot captures a screenshot and uploads it to an image host.  Every run
//! of the capture tool reads a small JSON file holding the operator's
//! preferences: which host to upload to, the API key for that host, the image
//! format, and a handful of on/off switches.
//!
//! - **`domain`** – The [`ConfigurationRecord`] itself, its built-in defaults,
//!   and the per-field normalization rules (blank-to-default, compression
//!   level range, PNG detection, `y`/`n` parsing).

pub mod domain;

// Re-export the most-used items at the crate root so callers can write
// `ezshot_core::ConfigurationRecord` instead of the full module path.
pub use domain::record::{
    is_png, normalize_compression_level, normalize_domain, normalize_image_type,
    parse_affirmative, ConfigurationRecord, DEFAULT_COMPRESSION_LEVEL, DEFAULT_DOMAIN,
    DEFAULT_IMAGE_TYPE, MAX_COMPRESSION_LEVEL,
};
