// Process Supervisor
// Launches viewers, screens out fast-failing launches, and kills survivors on shutdown

pub mod constants;
pub mod viewer;

pub use viewer::{ViewerCommand, ViewerConfig};

use crate::domain::{type_of, validate_name, ProfileType, ViewerKind};
use crate::error::{AppError, Result};
use crate::port::{ArtifactStore, ExecutionError, ProcessExit, ProcessLauncher};
use constants::DEFAULT_LIVENESS_WINDOW;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// A viewer that outlived the liveness window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisedProcess {
    pub pid: u32,
    pub name: String,
}

/// Kills a spawned viewer on drop unless its launch was settled
///
/// An `open` future dropped inside the liveness window (client hung up)
/// would otherwise leave a live process that no registry entry points at.
struct PendingLaunch<'a> {
    launcher: &'a dyn ProcessLauncher,
    pid: u32,
    settled: bool,
}

impl<'a> PendingLaunch<'a> {
    fn new(launcher: &'a dyn ProcessLauncher, pid: u32) -> Self {
        Self {
            launcher,
            pid,
            settled: false,
        }
    }

    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingLaunch<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(pid = self.pid, "Viewer launch abandoned, killing process");
        if let Err(e) = self.launcher.kill(self.pid) {
            error!(pid = self.pid, error = %e, "Failed to kill abandoned viewer");
        }
    }
}

/// Process Supervisor
///
/// Launch attempts go `Starting -> FailedFast | Live`. Only `Live` launches
/// enter the registry, and nothing re-checks them afterwards; `shutdown`
/// sends each one a forceful kill.
pub struct ProcessSupervisor {
    store: Arc<dyn ArtifactStore>,
    launcher: Arc<dyn ProcessLauncher>,
    viewers: ViewerConfig,
    liveness_window: Duration,
    registry: Mutex<Vec<SupervisedProcess>>,
}

impl ProcessSupervisor {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        launcher: Arc<dyn ProcessLauncher>,
        viewers: ViewerConfig,
    ) -> Self {
        Self {
            store,
            launcher,
            viewers,
            liveness_window: DEFAULT_LIVENESS_WINDOW,
            registry: Mutex::new(Vec::new()),
        }
    }

    pub fn with_liveness_window(mut self, window: Duration) -> Self {
        self.liveness_window = window;
        self
    }

    /// Launch the viewer for artifact `name`
    ///
    /// Returns once the viewer has survived the liveness window, or as soon
    /// as it exits inside it.
    ///
    /// # Errors
    /// - AppError::Validation / AppError::Domain for an empty or unsafe name
    /// - ExecutionError::SpawnFailed if the viewer binary cannot be launched
    /// - ExecutionError::FailedFast if the viewer exits within the window
    pub async fn open(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(AppError::Validation("missing `name`".to_string()));
        }
        validate_name(name)?;

        // Unrecognized prefixes still go to the generic snapshot viewer
        let kind = type_of(name)
            .parse::<ProfileType>()
            .map_or(ViewerKind::Pprof, |t| t.viewer_kind());
        let command = self.viewers.command_for(kind);
        let args = command.args_for(&self.store.path_of(name));

        let launched = self.launcher.spawn(&command.program, &args)?;
        let pid = launched.pid;
        let pending = PendingLaunch::new(self.launcher.as_ref(), pid);
        info!(name = %name, pid = pid, program = %command.program, "Starting viewer");

        match tokio::time::timeout(self.liveness_window, launched.exit).await {
            Ok(exit) => {
                pending.settle();
                let exit = exit.unwrap_or_else(|_| {
                    ProcessExit::WaitFailed("exit status unavailable".to_string())
                });
                error!(name = %name, pid = pid, exit = %exit, "Viewer process failed to run");
                Err(ExecutionError::FailedFast(exit.to_string()).into())
            }
            Err(_) => {
                info!(pid = pid, "Viewer seems to have started up successfully");
                let mut registry = self.registry.lock().await;
                registry.push(SupervisedProcess {
                    pid,
                    name: name.to_string(),
                });
                pending.settle();
                Ok(())
            }
        }
    }

    /// Force-kill every registered viewer, best effort
    ///
    /// Does not wait for the processes to exit. Kill failures are logged and
    /// skipped. Returns how many processes were signalled.
    pub async fn shutdown(&self) -> usize {
        let tracked = std::mem::take(&mut *self.registry.lock().await);
        info!(count = tracked.len(), "Exiting background processes...");

        for process in &tracked {
            info!(pid = process.pid, name = %process.name, "Killing viewer process");
            if let Err(e) = self.launcher.kill(process.pid) {
                error!(
                    pid = process.pid,
                    error = %e,
                    "Failed to kill viewer, background process may still be running"
                );
            }
        }

        tracked.len()
    }

    /// Snapshot of the registry
    pub async fn registered(&self) -> Vec<SupervisedProcess> {
        self.registry.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.registry.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::artifact_store::mocks::InMemoryArtifactStore;
    use crate::port::process_launcher::mocks::{MockBehavior, MockLauncher};
    use crate::port::time_provider::mocks::FixedTimeProvider;

    const WINDOW: Duration = Duration::from_millis(50);

    fn supervisor(behavior: MockBehavior) -> (ProcessSupervisor, Arc<MockLauncher>) {
        supervisor_with_window(behavior, WINDOW)
    }

    fn supervisor_with_window(
        behavior: MockBehavior,
        window: Duration,
    ) -> (ProcessSupervisor, Arc<MockLauncher>) {
        let store = Arc::new(InMemoryArtifactStore::new(Arc::new(
            FixedTimeProvider::at_secs(1),
        )));
        let launcher = Arc::new(MockLauncher::new(behavior));
        let supervisor = ProcessSupervisor::new(store, launcher.clone(), ViewerConfig::default())
            .with_liveness_window(window);
        (supervisor, launcher)
    }

    #[tokio::test]
    async fn test_live_viewer_is_registered() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);

        supervisor.open("heap-1234").await.unwrap();

        let registered = supervisor.registered().await;
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].name, "heap-1234");

        let spawned = launcher.spawned();
        let (program, args) = &spawned[0];
        assert_eq!(program, "go");
        assert_eq!(args[..3], ["tool", "pprof", "-http=:"]);
        assert_eq!(args.last().unwrap(), "/mock/profiles/heap-1234");
    }

    #[tokio::test]
    async fn test_trace_uses_trace_viewer() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);

        supervisor.open("trace-1234").await.unwrap();

        let spawned = launcher.spawned();
        let (_, args) = &spawned[0];
        assert_eq!(args[..2], ["tool", "trace"]);
    }

    #[tokio::test]
    async fn test_unknown_prefix_uses_pprof_viewer() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);

        supervisor.open("custom-1").await.unwrap();

        let spawned = launcher.spawned();
        let (_, args) = &spawned[0];
        assert_eq!(args[1], "pprof");
    }

    #[tokio::test]
    async fn test_fast_exit_is_reported_and_not_registered() {
        let (supervisor, _) = supervisor(MockBehavior::ExitImmediately(1));

        let err = supervisor.open("heap-1234").await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Execution(ExecutionError::FailedFast(_))
        ));
        assert!(err.to_string().contains("process failed to start"));
        assert!(supervisor.is_empty().await);
    }

    #[tokio::test]
    async fn test_even_clean_exit_inside_window_is_a_failure() {
        let (supervisor, _) = supervisor(MockBehavior::ExitImmediately(0));

        assert!(supervisor.open("heap-1234").await.is_err());
        assert!(supervisor.is_empty().await);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported_and_not_registered() {
        let (supervisor, _) = supervisor(MockBehavior::SpawnFails("not found".to_string()));

        let err = supervisor.open("heap-1234").await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Execution(ExecutionError::SpawnFailed { .. })
        ));
        assert!(supervisor.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_names_never_spawn() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);

        let err = supervisor.open("").await.unwrap_err();
        assert_eq!(err.to_string(), "missing `name`");
        assert!(err.is_caller_error());

        let err = supervisor.open("../../etc/passwd").await.unwrap_err();
        assert!(err.is_caller_error());

        assert!(launcher.spawned().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_kills_every_entry_despite_failures() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);
        supervisor.open("heap-1").await.unwrap();
        supervisor.open("trace-2").await.unwrap();

        let pids: Vec<u32> = supervisor.registered().await.iter().map(|p| p.pid).collect();
        launcher.refuse_kill(pids[0]);

        let signalled = supervisor.shutdown().await;

        assert_eq!(signalled, 2);
        assert_eq!(launcher.killed(), pids);
        assert!(supervisor.is_empty().await);
    }

    #[tokio::test]
    async fn test_abandoned_open_kills_viewer() {
        let (supervisor, launcher) =
            supervisor_with_window(MockBehavior::StayAlive, Duration::from_secs(30));
        let supervisor = Arc::new(supervisor);

        let task = {
            let supervisor = supervisor.clone();
            tokio::spawn(async move { supervisor.open("heap-1").await })
        };
        while launcher.spawned().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(launcher.killed(), vec![1000]);
        assert!(supervisor.is_empty().await);
        assert_eq!(supervisor.shutdown().await, 0);
    }

    #[tokio::test]
    async fn test_settled_launches_are_not_killed_on_return() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);
        supervisor.open("heap-1").await.unwrap();

        let (failing, failing_launcher) =
            supervisor_with_window(MockBehavior::ExitImmediately(1), WINDOW);
        assert!(failing.open("heap-1").await.is_err());

        assert!(launcher.killed().is_empty());
        assert!(failing_launcher.killed().is_empty());
    }

    #[tokio::test]
    async fn test_second_shutdown_signals_nothing() {
        let (supervisor, launcher) = supervisor(MockBehavior::StayAlive);
        supervisor.open("heap-1").await.unwrap();

        assert_eq!(supervisor.shutdown().await, 1);
        assert_eq!(supervisor.shutdown().await, 0);
        assert_eq!(launcher.killed().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_opens_all_register() {
        let (supervisor, _) = supervisor(MockBehavior::StayAlive);
        let supervisor = Arc::new(supervisor);

        let mut handles = vec![];
        for i in 0..5 {
            let supervisor = supervisor.clone();
            handles.push(tokio::spawn(async move {
                supervisor.open(&format!("heap-{}", i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(supervisor.len().await, 5);
    }
}
