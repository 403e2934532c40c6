// Process Launcher Port
// Abstraction for starting and force-killing external viewer processes

use std::fmt;
use thiserror::Error;
use tokio::sync::oneshot;

/// How a launched process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    /// Process exited; `code` is None when it was terminated by a signal
    Exited { code: Option<i32> },
    /// Waiting on the process failed
    WaitFailed(String),
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExit::Exited { code: Some(code) } => write!(f, "exit status: {}", code),
            ProcessExit::Exited { code: None } => write!(f, "terminated by signal"),
            ProcessExit::WaitFailed(msg) => write!(f, "wait failed: {}", msg),
        }
    }
}

/// A process that has been started but not waited on by the caller.
///
/// `exit` resolves once the launcher's background wait observes the exit.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub pid: u32,
    pub exit: oneshot::Receiver<ProcessExit>,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("failed to start `{program}`: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("process failed to start: {0}")]
    FailedFast(String),

    #[error("failed to kill PID {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },
}

/// Process Launcher trait
///
/// Implementations:
/// - SubprocessLauncher: spawns an OS process and reaps it in the background
pub trait ProcessLauncher: Send + Sync {
    /// Start `program` with `args` without waiting for it to finish
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the program cannot be launched at all
    fn spawn(&self, program: &str, args: &[String]) -> Result<LaunchedProcess, ExecutionError>;

    /// Forcefully terminate a process. Does not wait for it to exit.
    ///
    /// # Errors
    /// - ExecutionError::KillFailed if the signal cannot be delivered
    fn kill(&self, pid: u32) -> Result<(), ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Process exits right away with the given code
        ExitImmediately(i32),
        /// Process never exits on its own
        StayAlive,
        /// Program cannot be launched
        SpawnFails(String),
    }

    /// Mock Process Launcher for testing
    pub struct MockLauncher {
        behavior: MockBehavior,
        next_pid: AtomicU32,
        spawned: Mutex<Vec<(String, Vec<String>)>>,
        killed: Mutex<Vec<u32>>,
        unkillable: Mutex<HashSet<u32>>,
        // Keeps the exit channels of live processes open
        live: Mutex<Vec<oneshot::Sender<ProcessExit>>>,
    }

    impl MockLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                next_pid: AtomicU32::new(1000),
                spawned: Mutex::new(Vec::new()),
                killed: Mutex::new(Vec::new()),
                unkillable: Mutex::new(HashSet::new()),
                live: Mutex::new(Vec::new()),
            }
        }

        /// Make `kill(pid)` fail
        pub fn refuse_kill(&self, pid: u32) {
            self.unkillable.lock().unwrap().insert(pid);
        }

        pub fn spawned(&self) -> Vec<(String, Vec<String>)> {
            self.spawned.lock().unwrap().clone()
        }

        /// Every PID `kill` was called with, including failed attempts
        pub fn killed(&self) -> Vec<u32> {
            self.killed.lock().unwrap().clone()
        }
    }

    impl ProcessLauncher for MockLauncher {
        fn spawn(&self, program: &str, args: &[String]) -> Result<LaunchedProcess, ExecutionError> {
            self.spawned
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));

            let behavior = self.behavior.clone();
            let (tx, rx) = oneshot::channel();
            match behavior {
                MockBehavior::SpawnFails(reason) => {
                    return Err(ExecutionError::SpawnFailed {
                        program: program.to_string(),
                        reason,
                    })
                }
                MockBehavior::ExitImmediately(code) => {
                    let _ = tx.send(ProcessExit::Exited { code: Some(code) });
                }
                MockBehavior::StayAlive => self.live.lock().unwrap().push(tx),
            }

            Ok(LaunchedProcess {
                pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
                exit: rx,
            })
        }

        fn kill(&self, pid: u32) -> Result<(), ExecutionError> {
            self.killed.lock().unwrap().push(pid);
            if self.unkillable.lock().unwrap().contains(&pid) {
                return Err(ExecutionError::KillFailed {
                    pid,
                    reason: "operation not permitted".to_string(),
                });
            }
            Ok(())
        }
    }
}
