//! ezshot-config library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does ezshot-config do?
//!
//! It is the setup step of the e-zshot screenshot uploader.  Each run:
//!
//! 1. Loads `~/.config/e-zshot/config.json` through the
//!    [`ConfigStore`](infrastructure::storage::config::ConfigStore), or starts
//!    from an empty record on first run.
//! 2. Walks the operator through every setting with the
//!    [`ConfigReconciler`](application::reconcile::ConfigReconciler), showing
//!    the stored value as the default (skipped entirely with `--skip-config`).
//! 3. Fills in built-in defaults and clamps invalid values.
//! 4. Writes the result back atomically.

/// Application layer: the reconciliation use case and its input seam.
pub mod application;

/// Infrastructure layer: file storage and terminal prompting.
pub mod infrastructure;
