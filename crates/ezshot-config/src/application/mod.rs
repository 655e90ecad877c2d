//! Application layer use cases for the configuration tool.
//!
//! Use cases in this layer orchestrate the domain record from `ezshot-core`
//! and depend on traits rather than concrete I/O, so the terminal can be
//! replaced by scripted input in tests.
//!
//! # Sub-modules
//!
//! - **`reconcile`** – Merges the previously stored record with the
//!   operator's answers, applies defaults and range checks, and returns a
//!   record ready to be saved.

pub mod reconcile;
