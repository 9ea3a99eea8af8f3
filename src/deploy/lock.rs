// ABOUTME: Switch lock to prevent concurrent switches against the same state file.
// ABOUTME: Uses atomic file creation with lock info stored next to the state file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Information about who holds a switch lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new() -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file guarding a state file.
    pub fn lock_path(state_path: &Path) -> PathBuf {
        let mut name = state_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        state_path.with_file_name(name)
    }
}

impl Default for LockInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("switch already in progress (held by {holder}, pid {pid}, since {started_at}); use --force to override")]
    Held {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("lock {} acquired by another process while breaking it", .path.display())]
    Contended { path: PathBuf },

    #[error("failed to access lock {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A held switch lock that releases on drop.
#[derive(Debug)]
pub struct SwitchLock {
    path: PathBuf,
    released: bool,
}

impl SwitchLock {
    /// Acquire the lock guarding `state_path`.
    ///
    /// Uses create-new for atomic acquisition (no TOCTOU race).
    /// Auto-breaks stale locks (>1 hour) and unreadable locks with a warning;
    /// `force` breaks a live lock.
    pub fn acquire(state_path: &Path, force: bool) -> Result<Self, LockError> {
        let path = LockInfo::lock_path(state_path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| LockError::Io {
                path: path.clone(),
                source,
            })?;
        }

        if Self::try_create(&path)? {
            return Ok(Self {
                path,
                released: false,
            });
        }

        if !Self::should_break(&path, force)? {
            let existing = fs::read_to_string(&path)
                .ok()
                .and_then(|raw| serde_json::from_str::<LockInfo>(&raw).ok());
            return Err(match existing {
                Some(info) => LockError::Held {
                    holder: info.holder,
                    pid: info.pid,
                    started_at: info.started_at,
                },
                None => LockError::Contended { path },
            });
        }

        tracing::debug!("Removing stale/forced lock at {}", path.display());
        if let Err(e) = fs::remove_file(&path)
            && e.kind() != ErrorKind::NotFound
        {
            return Err(LockError::Io { path, source: e });
        }

        if Self::try_create(&path)? {
            Ok(Self {
                path,
                released: false,
            })
        } else {
            Err(LockError::Contended { path })
        }
    }

    /// Atomically create the lock file. Returns false if it already exists.
    fn try_create(path: &Path) -> Result<bool, LockError> {
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(io_err(e)),
        };

        let info = serde_json::to_string(&LockInfo::new())
            .map_err(|e| io_err(std::io::Error::other(e)))?;
        file.write_all(info.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        Ok(true)
    }

    /// Check if an existing lock should be broken (stale, forced, or corrupted).
    fn should_break(path: &Path, force: bool) -> Result<bool, LockError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => {
                return Err(LockError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        match serde_json::from_str::<LockInfo>(&raw) {
            Ok(existing) => {
                if force {
                    tracing::warn!(
                        "Breaking lock held by {} (pid {}) since {}",
                        existing.holder,
                        existing.pid,
                        existing.started_at
                    );
                    Ok(true)
                } else if existing.is_stale() {
                    tracing::warn!(
                        "Auto-breaking stale lock held by {} (pid {}) since {}",
                        existing.holder,
                        existing.pid,
                        existing.started_at
                    );
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Err(_) => {
                tracing::warn!("Lock info corrupted, breaking lock");
                Ok(true)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock, reporting failure instead of swallowing it.
    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LockError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for SwitchLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = fs::remove_file(&self.path);
        }
    }
}
