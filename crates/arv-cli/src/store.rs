//! # Snapshot Store
//!
//! The CLI keeps registry state in a single JSON snapshot file. Every
//! mutating command loads it, runs one registry operation, and writes it
//! back. Writes go to a sibling temp file that is synced and then renamed
//! over the original, so a crash never leaves a half-written snapshot.
//!
//! Concurrent invocations are serialized by an exclusive `flock` on a
//! sibling `<file>.lock`, held across the whole load/apply/save cycle.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use arv_core::CallerIdentity;
use arv_registry::{Registry, RegistrySnapshot};

/// Load the registry from `path`.
pub fn load(path: &Path) -> Result<Registry> {
    if !path.exists() {
        bail!(
            "registry state not found: {} (run `arv init --admin <id>` first)",
            path.display()
        );
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registry state: {}", path.display()))?;
    let snapshot: RegistrySnapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse registry state: {}", path.display()))?;
    let registry = Registry::from_snapshot(snapshot)
        .with_context(|| format!("inconsistent registry state: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded registry state");
    Ok(registry)
}

/// Write the registry to `path` atomically.
///
/// Callers that read-modify-write must hold the [`StateLock`].
pub fn save(path: &Path, registry: &Registry) -> Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    let json = serde_json::to_string_pretty(&registry.snapshot())?;

    let temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    let mut file = temp.as_file();
    file.write_all(json.as_bytes())
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file for {}", path.display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace registry state: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved registry state");
    Ok(())
}

/// Exclusive advisory lock on a snapshot's sibling lock file.
///
/// Released when dropped (the descriptor closes).
#[derive(Debug)]
pub struct StateLock {
    _file: File,
}

impl StateLock {
    /// Block until the exclusive lock for `path` is held.
    pub fn acquire(path: &Path) -> Result<Self> {
        let dir = parent_dir(path);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        let lock_path = lock_path(path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file: {}", lock_path.display()))?;
        flock_exclusive(&file)
            .with_context(|| format!("failed to lock registry state: {}", lock_path.display()))?;
        tracing::trace!(lock = %lock_path.display(), "acquired state lock");
        Ok(Self { _file: file })
    }
}

/// Create a fresh registry at `path`. Refuses to overwrite unless `force`.
pub fn create(path: &Path, administrator: CallerIdentity, force: bool) -> Result<Registry> {
    let _lock = StateLock::acquire(path)?;
    if path.exists() && !force {
        bail!(
            "registry state already exists: {} (pass --force to overwrite)",
            path.display()
        );
    }
    let registry = Registry::new(administrator);
    save(path, &registry)?;
    Ok(registry)
}

/// Load, apply `op`, and save only if `op` succeeds.
///
/// The state lock is held for the whole cycle, so concurrent updaters
/// apply one after another against the latest committed snapshot.
pub fn update<T>(path: &Path, op: impl FnOnce(&Registry) -> Result<T>) -> Result<T> {
    let _lock = StateLock::acquire(path)?;
    let registry = load(path)?;
    let out = op(&registry)?;
    save(path, &registry)?;
    Ok(out)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("arv-state"));
    name.push(".lock");
    path.with_file_name(name)
}

/// Blocking exclusive flock. A no-op on platforms without flock.
fn flock_exclusive(file: &File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        loop {
            // SAFETY: flock is a standard POSIX call. fd is a valid file
            // descriptor owned by `file` for the duration of the call.
            #[allow(unsafe_code)]
            let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
            if result == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(())
    }
}
