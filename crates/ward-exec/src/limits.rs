//! POSIX rlimit-based resource limits for spawned executor processes.
//!
//! On Unix the limits are applied inside a `pre_exec` hook, executed in the
//! child after `fork()` and immediately before `execve()`, so the executor
//! never runs without the intended restrictions. On non-Unix platforms the
//! request is a warned no-op, keeping the API callable everywhere.

use tokio::process::Command;
#[cfg(not(unix))]
use tracing::warn;

/// Declarative rlimits for an executor process.
///
/// All fields optional; `None` leaves the OS / parent limit unchanged.
#[derive(Debug, Clone, Default)]
pub struct RlimitConfig {
    /// Maximum number of open file descriptors (`RLIMIT_NOFILE`).
    pub max_open_files: Option<u64>,
    /// Maximum size of created files in bytes (`RLIMIT_FSIZE`).
    pub max_file_size_bytes: Option<u64>,
    /// Disable core dumps (`RLIMIT_CORE = 0`) when `true`.
    pub disable_core_dumps: bool,
}

impl RlimitConfig {
    /// Returns `true` if no explicit limits are configured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_open_files.is_none()
            && self.max_file_size_bytes.is_none()
            && !self.disable_core_dumps
    }
}

/// Attach rlimits to a `tokio::process::Command`.
pub fn attach_rlimits(cmd: &mut Command, config: &RlimitConfig) {
    if config.is_empty() {
        return;
    }

    #[cfg(unix)]
    {
        unix_impl::attach_rlimits(cmd, config);
    }

    #[cfg(not(unix))]
    {
        warn!(
            target: "ward_exec::limits",
            ?config,
            "rlimit-based process limits requested on a non-Unix OS; limits will be ignored"
        );
    }
}

#[cfg(unix)]
mod unix_impl {
    use super::RlimitConfig;

    use std::io;

    use tokio::process::Command;

    pub fn attach_rlimits(cmd: &mut Command, config: &RlimitConfig) {
        let max_open_files = config.max_open_files;
        let max_file_size_bytes = config.max_file_size_bytes;
        let disable_core_dumps = config.disable_core_dumps;

        unsafe {
            cmd.pre_exec(move || {
                if let Some(nofile) = max_open_files {
                    apply(unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &hard_limit(nofile)) })?;
                }
                if let Some(fsize) = max_file_size_bytes {
                    apply(unsafe { libc::setrlimit(libc::RLIMIT_FSIZE, &hard_limit(fsize)) })?;
                }
                if disable_core_dumps {
                    apply(unsafe { libc::setrlimit(libc::RLIMIT_CORE, &hard_limit(0)) })?;
                }
                Ok(())
            });
        }
    }

    fn hard_limit(value: u64) -> libc::rlimit {
        libc::rlimit {
            rlim_cur: value as libc::rlim_t,
            rlim_max: value as libc::rlim_t,
        }
    }

    fn apply(rc: libc::c_int) -> io::Result<()> {
        if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}
