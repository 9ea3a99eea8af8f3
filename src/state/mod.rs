// ABOUTME: Durable record of the currently live color.
// ABOUTME: Writes go through a synced temp file and an atomic rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::Color;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The single persisted fact "the live color is X".
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the active color.
    ///
    /// A missing, unreadable, or corrupt file reads as `None`.
    pub fn read(&self) -> Option<Color> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No active state at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    "Cannot read active state {}: {}; treating as absent",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match content.parse::<Color>() {
            Ok(color) => Some(color),
            Err(e) => {
                tracing::warn!(
                    "Corrupt active state {}: {}; treating as absent",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Record `color` as live. Durable once this returns.
    pub fn write(&self, color: Color) -> Result<(), StateError> {
        write_atomic(&self.path, format!("{color}\n").as_bytes()).map_err(|source| {
            StateError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::info!("Active state is now {}", color);
        Ok(())
    }
}

/// Replace `path` with `content` so readers see either the old or the new file.
///
/// The temp file lives next to the target so the rename stays on one
/// filesystem. Both the file and its directory are synced.
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Make the rename itself durable.
    if let Ok(dir) = std::fs::File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}
