//! Where nuc keeps its files, and how it writes them.
//!
//! All state lives in one per-user directory (default `~/.nuc/data`):
//!
//! ```text
//! ~/.nuc/data/          0700
//!   config.json         0600   API URL and client settings
//!   data.bin            0600   sealed token bundle
//! ```
//!
//! The directory is passed around as a `DataDir` value rather than looked
//! up globally, so tests can point everything at a temp directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{NucError, Result};

/// File name of the JSON settings file.
pub const CONFIG_FILE: &str = "config.json";

/// File name of the sealed token file.
pub const TOKEN_FILE: &str = "data.bin";

/// The per-user storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the data directory: explicit override first, otherwise
    /// `$HOME/.nuc/data`.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            NucError::ConfigError("cannot determine home directory; pass --data-dir".into())
        })?;
        Ok(Self::new(home.join(".nuc").join("data")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn token_path(&self) -> PathBuf {
        self.root.join(TOKEN_FILE)
    }
}

/// Create `dir` (and any missing parents) with owner-only permissions.
///
/// Existing directories are left as they are.
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;
    Ok(())
}

/// Write `data` to `path` **atomically** with owner-only permissions.
///
/// 1. Create the parent directory (0700) if needed.
/// 2. Write to a fresh temp file (0600) in the same directory and fsync it.
/// 3. Rename the temp file over the target path and fsync the directory.
///
/// Readers see either the previous content or the new content, never a
/// partial file.
pub fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_private_dir(parent)?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    // A leftover from an interrupted write may carry other permissions.
    match fs::remove_file(&tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(NucError::Io(e)),
    }

    let result = write_new_file(&tmp_path, data).and_then(|()| {
        fs::rename(&tmp_path, path)?;
        Ok(())
    });
    if result.is_ok() {
        sync_dir(parent)?;
    }

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Flush a directory entry change (the rename) to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

fn write_new_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}
