use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, trace};

use crate::ExecError;

/// Handle to a spawned executor OS process.
///
/// Owns the child; dropping the handle kills the process (the supervisor is
/// the only legitimate owner of executors it spawned).
#[derive(Debug)]
pub struct ExecutorProcess {
    child: Child,
    pid: Option<u32>,
}

impl ExecutorProcess {
    pub fn spawn(mut cmd: Command) -> Result<Self, ExecError> {
        let child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;
        let pid = child.id();
        debug!(target: "ward_exec::process", ?pid, "spawned executor process");
        Ok(Self { child, pid })
    }

    /// OS pid at spawn time; `None` once the child has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking liveness check against the owned child.
    pub fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                trace!(target: "ward_exec::process", %status, "executor process exited");
                false
            }
            Err(_) => false,
        }
    }

    /// Terminate the child: SIGTERM first, then a hard kill.
    ///
    /// Safe to call on an already-dead process.
    pub async fn terminate(&mut self) -> Result<(), ExecError> {
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, kill};
            use nix::unistd::Pid;
            if let Some(id) = self.child.id() {
                let _ = kill(Pid::from_raw(id as i32), Signal::SIGTERM);
                // Give the process a moment to exit on its own.
                let graceful = tokio::time::timeout(Duration::from_millis(500), self.child.wait());
                if let Ok(Ok(status)) = graceful.await {
                    debug!(target: "ward_exec::process", %status, "executor exited on SIGTERM");
                    return Ok(());
                }
            }
        }
        let _ = self.child.kill().await;
        let _ = self.child.wait().await;
        Ok(())
    }

    /// Wait for the child to exit on its own.
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus, ExecError> {
        Ok(self.child.wait().await?)
    }
}
