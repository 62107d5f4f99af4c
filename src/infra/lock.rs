// ABOUTME: Lock preventing concurrent engine runs against one infrastructure directory.
// ABOUTME: Uses atomic file creation with lock info stored as JSON in the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(all(unix, not(target_os = "linux")))]
use std::process::{Command, Stdio};

use super::error::InfraError;

pub const LOCK_FILENAME: &str = ".skylift.lock";

/// Information about who holds the lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Command holding the lock (plan, apply, ...).
    pub command: String,
}

impl LockInfo {
    pub fn new(command: &str) -> Self {
        Self {
            holder: hostname(),
            pid: std::process::id(),
            started_at: Utc::now(),
            command: command.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// The holder ran on this host and its process is gone, e.g. after a
    /// kill that skipped cleanup.
    pub fn is_orphaned(&self) -> bool {
        self.holder == hostname() && !process_alive(self.pid)
    }

    pub fn lock_path(dir: &Path) -> PathBuf {
        dir.join(LOCK_FILENAME)
    }
}

fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn process_alive(pid: u32) -> bool {
    // Unknown counts as alive so a live holder is never broken.
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(true)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// A held lock that releases on drop.
#[derive(Debug)]
pub struct InfraLock {
    path: PathBuf,
    released: bool,
    broken: Option<LockInfo>,
}

impl InfraLock {
    /// Acquire the lock for `dir`.
    ///
    /// Creation is atomic (`create_new`), so two processes cannot both
    /// succeed. Stale locks (>1 hour) and locks whose holder process on
    /// this host has exited are broken with a warning; `force` breaks any
    /// lock.
    pub fn acquire(dir: &Path, command: &str, force: bool) -> Result<Self, InfraError> {
        let path = LockInfo::lock_path(dir);
        let info = LockInfo::new(command);

        match Self::try_create(&path, &info) {
            Ok(()) => return Ok(Self::held(path, None)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => return Err(InfraError::LockIo { path, source }),
        }

        let existing = Self::read(&path);
        let should_break = match &existing {
            Some(existing) if force => {
                tracing::warn!(
                    "Force-breaking lock held by {} (pid {})",
                    existing.holder,
                    existing.pid
                );
                true
            }
            Some(existing) if existing.is_stale() => {
                tracing::warn!(
                    "Breaking stale lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                true
            }
            Some(existing) if existing.is_orphaned() => {
                tracing::warn!(
                    "Breaking lock left by exited process {} on this host",
                    existing.pid
                );
                true
            }
            Some(_) => false,
            None if force => {
                tracing::warn!("Force-breaking unreadable lock file {}", path.display());
                true
            }
            None => {
                return Err(InfraError::LockIo {
                    path,
                    source: io::Error::other("lock file is unreadable; pass --force-unlock"),
                });
            }
        };

        if !should_break && let Some(existing) = &existing {
            return Err(InfraError::LockHeld {
                holder: existing.holder.clone(),
                pid: existing.pid,
                command: existing.command.clone(),
                started_at: existing.started_at,
            });
        }

        if let Err(source) = fs::remove_file(&path)
            && source.kind() != io::ErrorKind::NotFound
        {
            return Err(InfraError::LockIo { path, source });
        }

        match Self::try_create(&path, &info) {
            Ok(()) => Ok(Self::held(path, existing)),
            Err(source) => Err(InfraError::LockIo { path, source }),
        }
    }

    fn held(path: PathBuf, broken: Option<LockInfo>) -> Self {
        tracing::debug!("acquired lock {}", path.display());
        Self {
            path,
            released: false,
            broken,
        }
    }

    fn try_create(path: &Path, info: &LockInfo) -> io::Result<()> {
        let json = serde_json::to_string(info).map_err(io::Error::other)?;
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(json.as_bytes())
    }

    fn read(path: &Path) -> Option<LockInfo> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The previous holder, when acquiring meant breaking its lock.
    pub fn broken(&self) -> Option<&LockInfo> {
        self.broken.as_ref()
    }

    /// Release explicitly, surfacing any removal error.
    pub fn release(mut self) -> Result<(), InfraError> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(InfraError::LockIo {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for InfraLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn write_lock(dir: &Path, started_at: DateTime<Utc>) {
        let info = LockInfo {
            holder: "other-host".to_string(),
            pid: 4242,
            started_at,
            command: "apply".to_string(),
        };
        fs::write(
            LockInfo::lock_path(dir),
            serde_json::to_string(&info).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn lock_info_is_stale_after_one_hour() {
        let mut info = LockInfo::new("plan");
        assert!(!info.is_stale());
        info.started_at = Utc::now() - Duration::minutes(61);
        assert!(info.is_stale());
    }

    #[test]
    fn acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InfraLock::acquire(dir.path(), "plan", false).unwrap();
        assert!(lock.path().exists());
        assert!(lock.broken().is_none());
        lock.release().unwrap();
        assert!(!LockInfo::lock_path(dir.path()).exists());
    }

    #[test]
    fn drop_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _lock = InfraLock::acquire(dir.path(), "plan", false).unwrap();
        }
        assert!(!LockInfo::lock_path(dir.path()).exists());
    }

    #[test]
    fn fresh_lock_blocks_second_holder() {
        let dir = tempfile::tempdir().unwrap();
        write_lock(dir.path(), Utc::now());

        let err = InfraLock::acquire(dir.path(), "apply", false).unwrap_err();
        match err {
            InfraError::LockHeld { holder, pid, .. } => {
                assert_eq!(holder, "other-host");
                assert_eq!(pid, 4242);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(LockInfo::lock_path(dir.path()).exists());
    }

    #[test]
    fn stale_lock_is_broken() {
        let dir = tempfile::tempdir().unwrap();
        write_lock(dir.path(), Utc::now() - Duration::hours(2));

        let lock = InfraLock::acquire(dir.path(), "apply", false).unwrap();
        assert_eq!(lock.broken().map(|b| b.pid), Some(4242));
        let content = fs::read_to_string(lock.path()).unwrap();
        let info: LockInfo = serde_json::from_str(&content).unwrap();
        assert_eq!(info.pid, std::process::id());
        assert_eq!(info.command, "apply");
    }

    #[cfg(unix)]
    #[test]
    fn lock_of_exited_local_process_is_broken() {
        let dir = tempfile::tempdir().unwrap();
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        let info = LockInfo {
            holder: hostname(),
            pid,
            started_at: Utc::now(),
            command: "plan".to_string(),
        };
        fs::write(
            LockInfo::lock_path(dir.path()),
            serde_json::to_string(&info).unwrap(),
        )
        .unwrap();

        let lock = InfraLock::acquire(dir.path(), "plan", false).unwrap();
        assert_eq!(lock.broken().map(|b| b.pid), Some(pid));
    }

    #[test]
    fn lock_of_live_local_process_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let _held = InfraLock::acquire(dir.path(), "apply", false).unwrap();

        let err = InfraLock::acquire(dir.path(), "plan", false).unwrap_err();
        assert!(matches!(err, InfraError::LockHeld { .. }));
    }

    #[test]
    fn force_breaks_fresh_lock() {
        let dir = tempfile::tempdir().unwrap();
        write_lock(dir.path(), Utc::now());

        assert!(InfraLock::acquire(dir.path(), "destroy", true).is_ok());
    }

    #[test]
    fn unreadable_lock_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(LockInfo::lock_path(dir.path()), "").unwrap();

        let err = InfraLock::acquire(dir.path(), "plan", false).unwrap_err();
        assert!(matches!(err, InfraError::LockIo { .. }));
        assert!(InfraLock::acquire(dir.path(), "plan", true).is_ok());
    }
}
