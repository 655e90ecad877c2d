//! Infrastructure layer for the configuration tool.
//!
//! Contains OS-facing adapters: the JSON config file store and the terminal
//! line reader.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ezshot_core`, but MUST NOT be imported by the `application` layer.

pub mod prompt;
pub mod storage;
