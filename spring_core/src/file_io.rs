//! # Project Files
//!
//! Reading and writing `.spring` project files:
//! - **Atomic saves**: write a sibling `.tmp`, fsync, then rename over the target
//! - **File locking**: a `.lock` sidecar describing the holder, backed by an
//!   OS advisory lock so two processes on one machine cannot both hold it
//! - **Version validation**: files from an incompatible schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use spring_core::file_io::{load_project, save_project, FileLock};
//! use spring_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("valve_springs.spring");
//! let lock = FileLock::acquire(path, "designer@company.com")?;
//!
//! let project = Project::new("Designer", "26-001", "Client");
//! save_project(&project, path)?;
//! let reloaded = load_project(path)?;
//! assert_eq!(reloaded.meta.job_id, "26-001");
//!
//! drop(lock);
//! # Ok::<(), spring_core::errors::CalcError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Project file extension
pub const PROJECT_EXTENSION: &str = "spring";

/// Locks older than this are considered abandoned
pub const LOCK_MAX_AGE_HOURS: i64 = 24;

/// Contents of a `.lock` sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Holder description used in `FileLocked` errors
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }

    /// True when the owning process is gone or the lock has aged out.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(LOCK_MAX_AGE_HOURS) {
            return true;
        }
        // Process liveness can only be checked on the machine that took the lock
        match hostname() {
            Some(ours) if ours == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// `name.ext` -> `name.ext.<suffix>`
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Give a path without an extension the `.spring` one
pub fn with_project_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(PROJECT_EXTENSION)
    }
}

/// Lock sidecar path for a project file
pub fn lock_path_for(project_path: &Path) -> PathBuf {
    sidecar_path(project_path, "lock")
}

fn io_error(operation: &str, path: &Path, err: std::io::Error) -> CalcError {
    CalcError::file_error(operation, path.display().to_string(), err.to_string())
}

/// Exclusive hold on a project file. Released (sidecar removed) on drop.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock on `path`.
    ///
    /// A live lock held by someone else yields `CalcError::FileLocked`; a
    /// stale one is taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    existing.holder(),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            log::warn!(
                "taking over stale lock on {} held by {}",
                path.display(),
                existing.holder()
            );
        }

        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| io_error("create lock", &lock_path, e))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .write_all(json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| io_error("write lock", &lock_path, e))?;

        log::debug!("acquired lock {}", lock_path.display());
        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live lock on `path`, if any, without acquiring it.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Unreadable or malformed sidecars count as no lock
fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let text = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&text).ok()
}

/// Save a project atomically.
///
/// The JSON is written to `<path>.tmp`, synced, then renamed over `path`, so
/// an interrupted save never leaves a truncated project behind.
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(CalcError::serialization)?;
    let tmp_path = sidecar_path(path, "tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| io_error("create temp file", &tmp_path, e))?;
    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| io_error("write temp file", &tmp_path, e))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error("rename to final", path, e)
    })?;

    log::info!("saved {} spring(s) to {}", project.spring_count(), path.display());
    Ok(())
}

/// Load a project, refusing incompatible schema versions.
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let text = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    let project: Project = serde_json::from_str(&text)
        .map_err(|e| CalcError::serialization(format!("Invalid project file {}: {}", path.display(), e)))?;
    validate_version(&project.meta.version)?;
    log::debug!("loaded {} spring(s) from {}", project.spring_count(), path.display());
    Ok(project)
}

/// Load a project together with the live lock on it, if another holder has one.
pub fn load_project_with_lock_check(path: &Path) -> CalcResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    Some((major, minor))
}

/// Major versions must match; within 0.x a newer minor is refused too.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (file_major, file_minor) = parse_version(file_version).ok_or_else(mismatch)?;
    let (major, minor) = parse_version(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != major || (major == 0 && file_minor > minor) {
        return Err(mismatch());
    }
    Ok(())
}
