//! Single-instance guard
//!
//! Only one poller may run per lock file. The lock is a file created with
//! `create_new`, holding the owner's PID, and removed again on drop.

use crate::error::{Result, SpotovaError};
use crate::logging::get_logger;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Held for the lifetime of the process
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Create the lock file or fail if another instance already holds it
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = std::fs::read_to_string(&path).unwrap_or_default();
                return Err(SpotovaError::already_running(format!(
                    "lock file {} exists (pid {}); single instance allowed",
                    path.display(),
                    owner.trim()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        get_logger("instance").debug(&format!("Acquired instance lock {}", path.display()));
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spotova.lock");

        let first = InstanceLock::acquire(&path).unwrap();
        let pid = std::fs::read_to_string(first.path()).unwrap();
        assert_eq!(pid.trim(), std::process::id().to_string());

        let err = InstanceLock::acquire(&path).unwrap_err();
        assert!(matches!(err, SpotovaError::AlreadyRunning { .. }));

        drop(first);
        assert!(!path.exists());
        assert!(InstanceLock::acquire(&path).is_ok());
    }
}
