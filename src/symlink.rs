// src/symlink.rs

//! Scoped swap-and-restore of symbolic links.
//!
//! Some external tools (deployment CLIs in particular) package files without
//! following links. Resolving a link moves it aside to `<link><suffix>` and
//! materialises a real copy of its target in its place; restoring removes the
//! copy and moves the link back.
//!
//! Invariants per link path `L`:
//! - a backup at `L<suffix>` means `L` has already been resolved, and a
//!   second resolve is a no-op;
//! - restore consumes the backup, so a resolve/restore round trip leaves no
//!   artefact behind.
//!
//! Only one transaction per path may be in flight at a time. Different paths
//! are independent and are processed concurrently.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use futures_util::future::join_all;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_BACKUP_SUFFIX;
use crate::errors::{DotboxError, Result};
use crate::types::ExecutionResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkTransaction {
    suffix: String,
}

impl Default for SymlinkTransaction {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_SUFFIX)
    }
}

impl SymlinkTransaction {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Sibling backup path: the link path with the suffix appended.
    pub fn backup_path(&self, link: &Path) -> PathBuf {
        let mut raw = link.as_os_str().to_os_string();
        raw.push(&self.suffix);
        PathBuf::from(raw)
    }

    /// Replace the link at `link` by a dereferenced copy of its target,
    /// keeping the link itself at the backup path.
    pub async fn resolve_link(&self, link: &Path) -> Result<()> {
        if !fs::try_exists(link).await.unwrap_or(false) {
            return Err(DotboxError::symlink(
                link,
                format!("{} file not found.", link.display()),
            ));
        }

        let backup = self.backup_path(link);
        if entry_exists(&backup).await {
            info!(link = %link.display(), "symlink backup exists, skipping resolution");
            return Ok(());
        }

        fs::rename(link, &backup).await.map_err(|e| {
            DotboxError::symlink_io(link, "An error occurred when resolving symlink", e)
        })?;

        if let Err(e) = copy_dereferenced(backup.clone(), link.to_path_buf()).await {
            // A backup next to a partial copy reads as a finished resolve.
            if let Err(rollback) = roll_back(link, &backup).await {
                warn!(
                    link = %link.display(),
                    error = %rollback,
                    "failed to put the symlink back after an aborted resolve"
                );
            }
            return Err(DotboxError::symlink_io(
                link,
                "An error occurred when resolving symlink",
                e,
            ));
        }

        debug!(link = %link.display(), backup = %backup.display(), "symlink resolved");
        Ok(())
    }

    /// Put the backed-up link back in place of whatever occupies `link`.
    pub async fn restore_link(&self, link: &Path) -> Result<()> {
        let backup = self.backup_path(link);
        if !entry_exists(&backup).await {
            return Err(DotboxError::symlink(
                link,
                format!("{} file not found.", backup.display()),
            ));
        }

        remove_entry(link).await.map_err(|e| {
            DotboxError::symlink_io(link, "An error occurred when restoring symlink", e)
        })?;

        fs::rename(&backup, link).await.map_err(|e| {
            DotboxError::symlink_io(link, "An error occurred when restoring symlink", e)
        })?;

        debug!(link = %link.display(), "symlink restored");
        Ok(())
    }

    /// Resolve every link concurrently. One result per link, in input order;
    /// failures are blocking.
    pub async fn resolve(&self, owner: &str, links: &[PathBuf]) -> Vec<ExecutionResult> {
        let attempts = links.iter().map(|link| async move {
            let label = format!("{owner} (Resolving {})", link.display());
            match self.resolve_link(link).await {
                Ok(()) => ExecutionResult::success(label),
                Err(err) => {
                    warn!(link = %link.display(), error = %err, "symlink resolution failed");
                    ExecutionResult::from_error(label, &err)
                }
            }
        });
        join_all(attempts).await
    }

    /// Restore every link concurrently. One result per link, in input order;
    /// `blocking` decides how failures are tagged.
    pub async fn restore(
        &self,
        owner: &str,
        links: &[PathBuf],
        blocking: bool,
    ) -> Vec<ExecutionResult> {
        let attempts = links.iter().map(|link| async move {
            let label = format!("{owner} (Restoring {})", link.display());
            match self.restore_link(link).await {
                Ok(()) => ExecutionResult::success(label),
                Err(err) => {
                    warn!(link = %link.display(), error = %err, "symlink restoration failed");
                    let mut result = ExecutionResult::from_error(label, &err);
                    result.blocking = blocking;
                    result
                }
            }
        });
        join_all(attempts).await
    }
}

/// True if anything, including a dangling link, sits at `path`.
async fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

async fn remove_entry(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
        Ok(_) => fs::remove_file(path).await,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Drop whatever was copied to `link` and move the backup back in place.
async fn roll_back(link: &Path, backup: &Path) -> io::Result<()> {
    remove_entry(link).await?;
    fs::rename(backup, link).await
}

/// Copy `src` to `dst`, following every link: files are copied by content,
/// directories recursively.
fn copy_dereferenced(
    src: PathBuf,
    dst: PathBuf,
) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send>> {
    Box::pin(async move {
        let meta = fs::metadata(&src).await?;

        if meta.is_dir() {
            fs::create_dir(&dst).await?;
            let mut entries = fs::read_dir(&src).await?;
            while let Some(entry) = entries.next_entry().await? {
                copy_dereferenced(entry.path(), dst.join(entry.file_name())).await?;
            }
        } else {
            fs::copy(&src, &dst).await?;
        }

        Ok(())
    })
}
