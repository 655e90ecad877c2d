//! Domain entities for e-zshot.
//!
//! This module contains pure business rules with no infrastructure
//! dependencies: no file system, no terminal, no environment reads.
//!
//! The only entity is the configuration record.  The rules that decide what a
//! valid record looks like (fallback defaults, the compression-level range,
//! the PNG-only compression policy) live next to it so that both the
//! reconciler and the tests share one definition.

/// The persisted configuration record and its field rules.
///
/// See [`record::ConfigurationRecord`] for the main type.
pub mod record;
