use std::fs::{File, OpenOptions, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Default PID/lock file location.
pub const DEFAULT_LOCK_PATH: &str = "/var/run/blindscan.pid";

/// Advisory singleton lock: exactly one scan run at a time per host.
///
/// The lock is acquired non-blocking so a second instance fails fast instead of
/// queueing behind a running scan. Held (and the file kept open) for the whole
/// process lifetime; the OS releases it on exit.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .with_context(|| format!("failed to create lock file {}", path.display()))?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                bail!("another blindscan instance is already running")
            }
            Err(TryLockError::Error(e)) => {
                return Err(e)
                    .with_context(|| format!("failed to lock {}", path.display()))
            }
        }

        file.set_len(0)
            .with_context(|| format!("failed to truncate {}", path.display()))?;
        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("failed to write pid to {}", path.display()))?;

        Ok(RunLock {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("blindscan-lock-{name}-{}", std::process::id()))
    }

    #[test]
    fn acquire_writes_own_pid() {
        let path = scratch_path("pid");
        let lock = RunLock::acquire(&path).unwrap();
        let contents = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
        drop(lock);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn second_acquire_in_same_process_fails() {
        let path = scratch_path("second");
        let first = RunLock::acquire(&path).unwrap();
        assert!(RunLock::acquire(&path).is_err());
        drop(first);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn reacquire_after_release() {
        let path = scratch_path("reacquire");
        drop(RunLock::acquire(&path).unwrap());
        let again = RunLock::acquire(&path);
        assert!(again.is_ok());
        drop(again);
        fs::remove_file(&path).unwrap();
    }
}
