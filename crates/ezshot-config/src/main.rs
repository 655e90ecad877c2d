//! e-zshot configuration tool entry point.
//!
//! Loads `~/.config/e-zshot/config.json`, asks the operator to confirm or
//! change each setting, and writes the result back.
//!
//! # Usage
//!
//! ```text
//! ezshot-config [--skip-config]
//!
//! Options:
//!   --skip-config   Re-save the stored (or default) configuration without prompting
//! ```
//!
//! Exit status is 0 when the configuration was saved and 1 when loading or
//! saving failed; the reason is printed on stderr.
//!
//! # Logging
//!
//! Log output goes to stderr so it does not mix with the prompts.  The level
//! defaults to `warn` and is overridden by `RUST_LOG` (e.g. `RUST_LOG=debug`).
//!
//! # Flow
//!
//! ```text
//! main()
//!  └─ ConfigStore::load()                -- None on first run
//!       └─ Decode error                  -- start from defaults
//!  └─ ConfigReconciler::reconcile()      -- prompts, unless --skip-config
//!  └─ ConfigStore::quarantine_corrupt()  -- only after a Decode error
//!  └─ ConfigStore::save()                -- temp file + rename
//! ```

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ezshot_config::application::reconcile::{ConfigReconciler, LineInput};
use ezshot_config::infrastructure::prompt::TerminalLineInput;
use ezshot_config::infrastructure::storage::config::{
    default_config_path, ConfigError, ConfigStore,
};
use ezshot_core::ConfigurationRecord;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive setup for the e-zshot screenshot uploader.
#[derive(Debug, Parser)]
#[command(
    name = "ezshot-config",
    about = "Configure the e-zshot screenshot uploader",
    version
)]
struct Cli {
    /// Re-save the stored (or default) configuration without prompting.
    #[arg(long)]
    skip_config: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = ConfigStore::new(default_config_path()?);
    info!(path = %store.path().display(), skip = cli.skip_config, "configuration tool starting");

    run(
        &store,
        TerminalLineInput::stdio(),
        !cli.skip_config,
        &mut io::stdout(),
    )?;
    Ok(())
}

/// One load → reconcile → save cycle.  Returns the record that was saved.
fn run<I, W>(
    store: &ConfigStore,
    input: I,
    interactive: bool,
    out: &mut W,
) -> anyhow::Result<ConfigurationRecord>
where
    I: LineInput,
    W: Write,
{
    let stored = load_previous(store)?;

    if interactive {
        writeln!(out, "Please configure your settings:")?;
    }
    let record = ConfigReconciler::new(input).reconcile(stored.record, interactive);

    // The unreadable file stays at its path until the replacement is ready.
    if stored.corrupt {
        store
            .quarantine_corrupt()
            .context("failed to back up unreadable configuration")?;
    }
    store.save(&record).with_context(|| {
        format!(
            "failed to save configuration to {}",
            store.path().display()
        )
    })?;

    writeln!(
        out,
        "Configuration saved successfully to: {}",
        store.path().display()
    )?;
    if record.verbose {
        writeln!(out, "\nCurrent Configuration:\n{record}")?;
    }
    Ok(record)
}

/// Outcome of reading the config file before reconciliation.
#[derive(Debug, Default)]
struct StoredConfig {
    record: Option<ConfigurationRecord>,
    /// The file exists but could not be decoded.
    corrupt: bool,
}

/// Loads the stored record.  An unreadable file is treated as absent, since
/// the record can always be regenerated; it is left on disk untouched.
fn load_previous(store: &ConfigStore) -> anyhow::Result<StoredConfig> {
    match store.load() {
        Ok(record) => Ok(StoredConfig {
            record,
            corrupt: false,
        }),
        Err(e @ ConfigError::Decode { .. }) => {
            warn!(error = %e, "stored configuration is unreadable; starting from defaults");
            Ok(StoredConfig {
                record: None,
                corrupt: true,
            })
        }
        Err(e) => Err(e).context("failed to load configuration"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
