//! Single-instance guard
//!
//! Two concurrent sessions would freeze the screen twice and stack two
//! overlay fleets, so only one may run. An OS advisory lock on a file in the
//! runtime directory enforces this; a lock file left behind by a crashed
//! process carries no lock and is re-acquired normally.

use anyhow::{anyhow, Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::PathBuf;

/// A held instance lock, released on drop
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Acquire the lock for `app_name`, failing immediately if another
    /// instance holds it
    pub fn try_acquire(app_name: &str) -> Result<Self> {
        let dir = lock_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create lock directory {}", dir.display()))?;

        let path = dir.join(format!("{app_name}.lock"));
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow!(
                "another capture session is already running (lock: {})",
                path.display()
            )
        })?;

        Ok(Self { file, path })
    }

    /// Delete the lock file without checking the lock. Only safe when no
    /// other instance is running.
    pub fn force_release(app_name: &str) -> Result<()> {
        let path = lock_dir()?.join(format!("{app_name}.lock"));
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove lock file {}", path.display()))?;
        }
        Ok(())
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

/// XDG_RUNTIME_DIR where available, cache dir otherwise
fn lock_dir() -> Result<PathBuf> {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("no runtime or cache directory to place the lock in")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_first_released() {
        let name = "snapcrop-lock-test-a";

        let first = InstanceLock::try_acquire(name).unwrap();
        assert!(InstanceLock::try_acquire(name).is_err());

        drop(first);
        assert!(InstanceLock::try_acquire(name).is_ok());
    }

    #[test]
    fn force_release_removes_the_file() {
        let name = "snapcrop-lock-test-b";

        let lock = InstanceLock::try_acquire(name).unwrap();
        let path = lock.path.clone();
        drop(lock);
        assert!(!path.exists());

        // Idempotent when no file exists
        InstanceLock::force_release(name).unwrap();
    }
}
