//! JSON-based configuration persistence.
//!
//! Reads and writes [`ConfigurationRecord`] at a path chosen by the caller.
//! The binary uses [`default_config_path`], which resolves to
//! `~/.config/e-zshot/config.json`; tests point the store at a temporary
//! directory instead.
//!
//! # Load outcomes
//!
//! | File state            | Result                              |
//! |-----------------------|-------------------------------------|
//! | absent                | `Ok(None)` – first run              |
//! | present, valid JSON   | `Ok(Some(record))`                  |
//! | present, invalid JSON | `Err(ConfigError::Decode { .. })`   |
//! | unreadable            | `Err(ConfigError::Io { .. })`       |
//!
//! # Atomic save
//!
//! The record is written to `config.json.tmp` next to the destination,
//! synced, and renamed over `config.json`.  A reader (or an interrupted run)
//! sees either the previous file or the new one, never a partial write.
//!
//! On Unix the directory is created `0700` and the file `0600`: the file
//! holds the upload API key.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ezshot_core::ConfigurationRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Directory under `~/.config` that holds the config file.
pub const APP_DIR_NAME: &str = "e-zshot";

/// File name of the persisted record.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not a valid configuration record.
    #[error("failed to parse config at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be serialized.
    #[error("failed to serialize config: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ConfigError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Resolves `~/.config/e-zshot/config.json` for the current user.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] when the home directory cannot be
/// determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| config_path_in(&home))
        .ok_or(ConfigError::NoHomeDir)
}

/// The config file location relative to a given home directory.
pub fn config_path_in(home: &Path) -> PathBuf {
    home.join(".config").join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// `path` with `suffix` appended to its final component.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

// ── Config store ──────────────────────────────────────────────────────────────

/// Loads and saves the configuration record at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the file at `path`.  Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The config file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored record, or `None` if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] if the file is not a valid record and
    /// [`ConfigError::Io`] for file-system errors other than "not found".
    pub fn load(&self) -> Result<Option<ConfigurationRecord>, ConfigError> {
        match fs::read(&self.path) {
            Ok(content) => {
                let record = serde_json::from_slice(&content).map_err(|source| {
                    ConfigError::Decode {
                        path: self.path.clone(),
                        source,
                    }
                })?;
                debug!(path = %self.path.display(), "configuration loaded");
                Ok(Some(record))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no configuration file yet");
                Ok(None)
            }
            Err(e) => Err(ConfigError::io(&self.path, e)),
        }
    }

    /// Persists `record`, replacing any previous file atomically.
    ///
    /// Creates the containing directory (and its parents) if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system failures or
    /// [`ConfigError::Encode`] if serialization fails.  On error the
    /// previous file, if any, is left in place.
    pub fn save(&self, record: &ConfigurationRecord) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(|e| ConfigError::io(dir, e))?;
        }

        let mut content = serde_json::to_string_pretty(record).map_err(ConfigError::Encode)?;
        content.push('\n');

        let tmp_path = sibling_path(&self.path, ".tmp");
        if let Err(e) = write_synced(&tmp_path, content.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ConfigError::io(&tmp_path, e));
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ConfigError::io(&self.path, e));
        }
        if let Err(e) = sync_parent_directory(&self.path) {
            // The rename already happened; only durability across a crash is at stake.
            warn!(path = %self.path.display(), error = %e, "failed to sync config directory");
        }

        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Copies an unreadable config file to `config.json.corrupt.<secs>`.
    ///
    /// The original stays in place until the next [`save`](Self::save)
    /// replaces it.  A backup is never overwritten: when the name is taken
    /// (two quarantines within one second) a `.1`, `.2`, ... suffix is added.
    /// Returns the backup path, or `None` when there was no file to copy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read or the backup
    /// cannot be written.
    pub fn quarantine_corrupt(&self) -> Result<Option<PathBuf>, ConfigError> {
        let mut source = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::io(&self.path, e)),
        };

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let base = sibling_path(&self.path, &format!(".corrupt.{stamp}"));

        let mut attempt = 0u32;
        let (backup, mut target) = loop {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                sibling_path(&base, &format!(".{attempt}"))
            };
            match create_private_file(&candidate) {
                Ok(file) => break (candidate, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(ConfigError::io(&candidate, e)),
            }
        };

        if let Err(e) = io::copy(&mut source, &mut target).and_then(|_| target.sync_all()) {
            let _ = fs::remove_file(&backup);
            return Err(ConfigError::io(&backup, e));
        }

        warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            "copied unreadable configuration aside"
        );
        Ok(Some(backup))
    }
}

// ── File system helpers ───────────────────────────────────────────────────────

fn create_private_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}

fn create_private_file(path: &Path) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    // A stale temp file from an interrupted run would keep its old mode.
    let _ = fs::remove_file(path);

    let mut file = create_private_file(path)?;
    file.write_all(content)?;
    file.flush()?;
    file.sync_all()
}

fn sync_parent_directory(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::File::open(parent)?.sync_all()?;
        }
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ezshot_core::DEFAULT_DOMAIN;
    use serde_json::{json, Map};
    use tempfile::TempDir;

    fn sample_record() -> ConfigurationRecord {
        ConfigurationRecord {
            api_key: "abc123".to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            image_type: "png".to_string(),
            compression_level: 6,
            save_to_disk: true,
            upload_to_api: true,
            verbose: false,
            text_plugin_enabled: false,
            extra: Map::new(),
        }
    }

    fn store_in(tmp: &TempDir) -> ConfigStore {
        ConfigStore::new(config_path_in(tmp.path()))
    }

    // ── Paths ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_config_path_in_home_is_dot_config_e_zshot_config_json() {
        let path = config_path_in(Path::new("/home/alice"));
        assert_eq!(path, PathBuf::from("/home/alice/.config/e-zshot/config.json"));
    }

    #[test]
    fn test_default_config_path_ends_with_config_json() {
        // NoHomeDir is acceptable in a stripped environment.
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with(".config/e-zshot/config.json"), "got {path:?}");
        }
    }

    // ── Load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_returns_none_when_file_absent() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        // Act
        let result = store.load();

        // Assert
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_load_invalid_json_returns_decode_error() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(store.path(), "{ not json").unwrap();

        // Act
        let result = store.load();

        // Assert
        assert!(matches!(result, Err(ConfigError::Decode { .. })));
    }

    #[test]
    fn test_load_repairs_oversized_compression_level() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(
            store.path(),
            r#"{"api_key":"secret","domain":"https://i.e-z.host/","compression_level":10000000000}"#,
        )
        .unwrap();

        // Act
        let record = store.load().unwrap().expect("record present");

        // Assert
        assert_eq!(record.api_key, "secret");
        assert_eq!(record.domain, "https://i.e-z.host/");
        assert_eq!(record.compression_level, ezshot_core::DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn test_load_non_utf8_file_returns_decode_error() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(store.path(), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Decode { .. })));
    }

    #[test]
    fn test_load_directory_in_place_of_file_returns_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::create_dir(store.path()).unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Io { .. })));
    }

    // ── Save ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_first_run_save_creates_directory_and_file() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        assert!(matches!(store.load(), Ok(None)));

        // Act
        store.save(&sample_record()).unwrap();

        // Assert
        assert!(store.path().is_file());
        let loaded = store.load().unwrap();
        assert_eq!(loaded, Some(sample_record()));
    }

    #[test]
    fn test_save_and_load_round_trip_preserves_extra_keys() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let mut record = sample_record();
        record
            .extra
            .insert("screenshot_tool".to_string(), json!("grim"));
        record.extra.insert("plugins".to_string(), json!(["logging"]));

        // Act
        store.save(&record).unwrap();
        let loaded = store.load().unwrap().expect("record present");

        // Assert
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.save(&sample_record()).unwrap();

        let mut updated = sample_record();
        updated.api_key = "rotated".to_string();
        updated.verbose = true;
        store.save(&updated).unwrap();

        assert_eq!(store.load().unwrap(), Some(updated));
    }

    #[test]
    fn test_save_writes_two_space_indented_json_with_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.save(&sample_record()).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("{\n  \"api_key\": \"abc123\",\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_save_leaves_no_temporary_file() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.save(&sample_record()).unwrap();

        let tmp_path = sibling_path(store.path(), ".tmp");
        assert!(!tmp_path.exists());
    }

    #[test]
    fn test_save_replaces_stale_temporary_file() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(sibling_path(store.path(), ".tmp"), "leftover").unwrap();

        store.save(&sample_record()).unwrap();

        assert_eq!(store.load().unwrap(), Some(sample_record()));
    }

    #[test]
    fn test_failed_save_keeps_previous_content_and_cleans_up() {
        // Arrange: a non-empty directory sits where the file should be, so
        // the final rename must fail.
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("keep.txt"), "previous").unwrap();

        // Act
        let result = store.save(&sample_record());

        // Assert
        assert!(matches!(result, Err(ConfigError::Io { .. })));
        assert_eq!(
            fs::read_to_string(store.path().join("keep.txt")).unwrap(),
            "previous"
        );
        assert!(!sibling_path(store.path(), ".tmp").exists());
    }

    #[test]
    fn test_save_fails_when_parent_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let store = ConfigStore::new(blocker.join("config.json"));

        let result = store.save(&sample_record());

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_creates_owner_only_directory_and_file() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        // Act
        store.save(&sample_record()).unwrap();

        // Assert
        let dir_mode = fs::metadata(store.path().parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700, "config directory should be 0700");
        assert_eq!(file_mode, 0o600, "config file should be 0600");
    }

    // ── Quarantine ────────────────────────────────────────────────────────────

    #[test]
    fn test_quarantine_copies_corrupt_file_aside() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(store.path(), "garbage").unwrap();

        // Act
        let backup = store.quarantine_corrupt().unwrap().expect("backup path");

        // Assert: the original stays until the next save replaces it
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "garbage");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "garbage");
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("config.json.corrupt."), "got {name}");
    }

    #[test]
    fn test_quarantine_twice_keeps_both_backups() {
        // Arrange
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(store.path(), "first").unwrap();
        let first = store.quarantine_corrupt().unwrap().expect("first backup");
        fs::write(store.path(), "second").unwrap();

        // Act: usually lands in the same second as the first backup
        let second = store.quarantine_corrupt().unwrap().expect("second backup");

        // Assert
        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(fs::read_to_string(&second).unwrap(), "second");
    }

    #[test]
    fn test_quarantine_suffixes_backup_when_name_is_taken() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(store.path(), "corrupt").unwrap();
        // Pre-create backups for this second and the next.
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        for stamp in [now, now + 1] {
            fs::write(sibling_path(store.path(), &format!(".corrupt.{stamp}")), "older").unwrap();
        }

        let backup = store.quarantine_corrupt().unwrap().expect("backup path");

        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".1"), "got {name}");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "corrupt");
    }

    #[cfg(unix)]
    #[test]
    fn test_quarantine_backup_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        fs::write(store.path(), "{ \"api_key\": ").unwrap();

        let backup = store.quarantine_corrupt().unwrap().expect("backup path");

        let mode = fs::metadata(&backup).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_quarantine_without_file_returns_none() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));

        assert!(matches!(store.quarantine_corrupt(), Ok(None)));
    }
}
