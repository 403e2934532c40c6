// Subprocess launcher implementation
// reason: tokio::process for non-blocking spawn + background reaping
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info};

use pprofit_core::port::{ExecutionError, LaunchedProcess, ProcessExit, ProcessLauncher};

/// Where viewer stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Share the server's terminal, so viewers can print their own URL
    #[default]
    Inherit,
    /// Discard
    Null,
}

impl OutputMode {
    fn stdio(self) -> Stdio {
        match self {
            OutputMode::Inherit => Stdio::inherit(),
            OutputMode::Null => Stdio::null(),
        }
    }
}

/// PIDs of children that have not been reaped yet
type RunningSet = Arc<Mutex<HashSet<u32>>>;

/// Subprocess launcher
/// Spawns viewer processes detached from the caller; a background task
/// waits on each one and reports its exit.
///
/// Only running children are ever signalled. Once a child is reaped its PID
/// may belong to an unrelated process.
#[derive(Debug, Default)]
pub struct SubprocessLauncher {
    output: OutputMode,
    running: RunningSet,
}

impl SubprocessLauncher {
    pub fn new(output: OutputMode) -> Self {
        Self {
            output,
            running: RunningSet::default(),
        }
    }

    fn is_running(&self, pid: u32) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&pid)
    }

    /// Send SIGKILL
    #[cfg(unix)]
    fn kill_forcefully(&self, pid: u32) -> Result<(), ExecutionError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let raw = i32::try_from(pid).map_err(|_| ExecutionError::KillFailed {
            pid,
            reason: "PID out of range".to_string(),
        })?;

        kill(Pid::from_raw(raw), Signal::SIGKILL).map_err(|e| ExecutionError::KillFailed {
            pid,
            reason: e.to_string(),
        })
    }

    /// taskkill with /F flag (force kill)
    #[cfg(windows)]
    fn kill_forcefully(&self, pid: u32) -> Result<(), ExecutionError> {
        let output = std::process::Command::new("taskkill")
            .args(["/F", "/PID", &pid.to_string()])
            .output()
            .map_err(|e| ExecutionError::KillFailed {
                pid,
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExecutionError::KillFailed {
                pid,
                reason: format!(
                    "taskkill failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        Ok(())
    }
}

impl ProcessLauncher for SubprocessLauncher {
    fn spawn(&self, program: &str, args: &[String]) -> Result<LaunchedProcess, ExecutionError> {
        let spawn_failed = |reason: String| ExecutionError::SpawnFailed {
            program: program.to_string(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(self.output.stdio())
            .stderr(self.output.stdio())
            .spawn()
            .map_err(|e| spawn_failed(e.to_string()))?;

        let pid = child
            .id()
            .ok_or_else(|| spawn_failed("process exited before its PID was read".to_string()))?;

        info!(pid = pid, program = %program, args = ?args, "Spawned process");
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pid);

        let running = self.running.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => ProcessExit::Exited {
                    code: status.code(),
                },
                Err(e) => ProcessExit::WaitFailed(e.to_string()),
            };
            running
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&pid);
            debug!(pid = pid, exit = %exit, "Process exited");
            // Receiver is gone once the launch has been judged live
            let _ = tx.send(exit);
        });

        Ok(LaunchedProcess { pid, exit: rx })
    }

    fn kill(&self, pid: u32) -> Result<(), ExecutionError> {
        if !self.is_running(pid) {
            return Err(ExecutionError::KillFailed {
                pid,
                reason: "process already finished".to_string(),
            });
        }
        self.kill_forcefully(pid)
    }
}
