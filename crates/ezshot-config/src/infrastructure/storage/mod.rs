//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the JSON configuration file from an injected path.
//! - Telling "no file yet" apart from "file present but unreadable".
//! - Writing the reconciled record back with an atomic replace, so an
//!   interrupted run never leaves a half-written file behind.

pub mod config;
