// Supervisor Use Case (ADR-002)
// Owns zero-or-one Burp Suite child process and the two-phase termination protocol

use crate::application::constants::{
    GRACEFUL_SHUTDOWN_POLL_ATTEMPTS, GRACEFUL_SHUTDOWN_POLL_INTERVAL, START_SETTLE_DURATION,
};
use crate::domain::settings::validate_project_name;
use crate::domain::{
    ExitState, ProcessSignal, ScanConfig, SessionRecord, StartOutcome, StartRequest,
    StatusReport, StopOutcome, SupervisorSettings,
};
use crate::error::{AppError, Result};
use crate::port::{
    ChildProcess, ConfigStore, ProcessError, ProcessLauncher, SessionStore, TimeProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The child currently under supervision
struct TrackedProcess {
    child: Box<dyn ChildProcess>,
    pid: u32,
    port: u16,
}

/// Process supervisor for one headless Burp Suite instance
///
/// State machine: stopped -> running (successful `start`) -> stopped
/// (`stop`, observed exit, failed start). Only one supervisor should manage a
/// given project directory at a time.
pub struct Supervisor {
    settings: SupervisorSettings,
    launcher: Arc<dyn ProcessLauncher>,
    config_store: Arc<dyn ConfigStore>,
    session_store: Arc<dyn SessionStore>,
    time_provider: Arc<dyn TimeProvider>,
    tracked: Option<TrackedProcess>,
}

impl Supervisor {
    /// Create a new supervisor
    ///
    /// Creates the project directory (with parents) and checks that the JAR
    /// exists. Nothing is spawned.
    ///
    /// # Errors
    /// - AppError::ProjectDir if the project directory cannot be created
    /// - AppError::ExecutableNotFound if the JAR path does not exist
    pub fn new(
        settings: SupervisorSettings,
        launcher: Arc<dyn ProcessLauncher>,
        config_store: Arc<dyn ConfigStore>,
        session_store: Arc<dyn SessionStore>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&settings.project_dir).map_err(|source| {
            AppError::ProjectDir {
                path: settings.project_dir.clone(),
                source,
            }
        })?;

        if !settings.jar_path.exists() {
            return Err(AppError::ExecutableNotFound(settings.jar_path.clone()));
        }

        Ok(Self {
            settings,
            launcher,
            config_store,
            session_store,
            time_provider,
            tracked: None,
        })
    }

    /// Pid of the tracked child, alive or not
    pub fn pid(&self) -> Option<u32> {
        self.tracked.as_ref().map(|t| t.pid)
    }

    /// Re-attach to the child recorded by an earlier `start`
    ///
    /// Stale records (process gone) and unreadable records are deleted.
    /// Returns the adopted pid.
    pub fn restore_session(&mut self) -> Result<Option<u32>> {
        if let Some(tracked) = &self.tracked {
            return Ok(Some(tracked.pid));
        }

        let record = match self.session_store.load() {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(AppError::Session(reason)) => {
                warn!(reason = %reason, "Session record is unreadable, discarding");
                self.session_store.clear()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match self.launcher.adopt(record.pid) {
            Some(child) => {
                info!(pid = %record.pid, port = %record.port, "Adopted Burp Suite process from previous session");
                self.tracked = Some(TrackedProcess {
                    child,
                    pid: record.pid,
                    port: record.port,
                });
                Ok(Some(record.pid))
            }
            None => {
                warn!(pid = %record.pid, "Session record points to a dead process, discarding");
                self.session_store.clear()?;
                Ok(None)
            }
        }
    }

    /// Start Burp Suite in headless mode
    ///
    /// Idempotent while the child is alive: a second call returns
    /// `AlreadyRunning` without spawning. Every failure is returned as
    /// `StartOutcome::Failed`.
    pub async fn start(&mut self, request: StartRequest) -> StartOutcome {
        if let Some(pid) = self.running_pid() {
            let tracked_port = self.tracked.as_ref().map(|t| t.port);
            info!(pid = %pid, tracked_port = ?tracked_port, "Burp Suite already running");
            return StartOutcome::AlreadyRunning {
                pid,
                port: request.port,
            };
        }

        // A previous child exited on its own; forget it before launching again
        self.tracked = None;

        match self.launch(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, project = %request.project_name, "Failed to start Burp Suite");
                StartOutcome::failed(e)
            }
        }
    }

    /// Stop the tracked child: SIGTERM to its group, bounded poll, then SIGKILL
    pub async fn stop(&mut self) -> StopOutcome {
        let time_provider = self.time_provider.clone();
        let Some(tracked) = self.tracked.as_mut() else {
            return StopOutcome::NotRunning;
        };
        let pid = tracked.pid;

        match terminate(tracked.child.as_mut(), time_provider.as_ref()).await {
            Ok(exit) => {
                info!(pid = %pid, exit_code = ?exit.code, signal = ?exit.signal, "Burp Suite stopped");
                self.tracked = None;
                if let Err(e) = self.session_store.clear() {
                    warn!(error = %e, "Failed to clear session record");
                }
                StopOutcome::Stopped
            }
            Err(e) => {
                error!(pid = %pid, error = %e, "Failed to stop Burp Suite");
                StopOutcome::error(e)
            }
        }
    }

    /// Report liveness of the tracked child (does not clear an exited child)
    pub fn get_status(&mut self) -> StatusReport {
        let Some(tracked) = self.tracked.as_mut() else {
            return StatusReport::stopped();
        };

        match tracked.child.try_wait() {
            Ok(None) => StatusReport::Running { pid: tracked.pid },
            Ok(Some(exit)) => StatusReport::Stopped {
                return_code: exit.code,
                signal: exit.signal,
            },
            Err(e) => {
                warn!(pid = %tracked.pid, error = %e, "Could not determine process state");
                StatusReport::stopped()
            }
        }
    }

    /// Write a Burp configuration document to `output_path`
    ///
    /// Overwrites any existing file; no merge with previous content.
    ///
    /// # Errors
    /// - AppError::Domain if the port or a thread count is zero
    /// - AppError::Io / Serialization if the document cannot be written
    pub fn create_config(
        &self,
        output_path: impl AsRef<Path>,
        proxy_port: u16,
        spider_threads: u32,
        scanner_threads: u32,
    ) -> Result<PathBuf> {
        let config = ScanConfig::new(proxy_port, spider_threads, scanner_threads)?;
        write_config(self.config_store.as_ref(), output_path.as_ref(), &config)
    }

    pub fn read_config(&self, path: impl AsRef<Path>) -> Result<ScanConfig> {
        self.config_store.read(path.as_ref())
    }

    fn running_pid(&mut self) -> Option<u32> {
        let tracked = self.tracked.as_mut()?;
        match tracked.child.try_wait() {
            Ok(None) => Some(tracked.pid),
            Ok(Some(_)) => None,
            Err(e) => {
                warn!(pid = %tracked.pid, error = %e, "Liveness check failed, treating as exited");
                None
            }
        }
    }

    async fn launch(&mut self, request: &StartRequest) -> Result<StartOutcome> {
        validate_project_name(&request.project_name)?;

        let config_file = self.resolve_config_file(request)?;
        let spec = self
            .settings
            .launch_spec(&request.project_name, Some(&config_file))?;
        let project_file = self.settings.project_file(&request.project_name);

        info!(command = %spec.display_command(), "Launching Burp Suite");
        let mut child = self.launcher.launch(&spec)?;
        let pid = child.pid();

        self.time_provider.sleep(START_SETTLE_DURATION).await;

        let exited = match child.try_wait() {
            Ok(exited) => exited,
            Err(e) => {
                // Untracked survivor would leak; take the group down with us
                if let Err(kill_err) = child.signal_group(ProcessSignal::Kill) {
                    warn!(pid = %pid, error = %kill_err, "Failed to kill unobservable child");
                }
                return Err(e.into());
            }
        };

        if let Some(exit) = exited {
            let stderr = child.captured_output().await;
            warn!(pid = %pid, exit_code = ?exit.code, signal = ?exit.signal, "Burp Suite exited during startup");
            return Ok(StartOutcome::failed(format!(
                "Burp Suite failed to start ({}): {}",
                describe_exit(&exit),
                stderr.trim()
            )));
        }

        self.tracked = Some(TrackedProcess {
            child,
            pid,
            port: request.port,
        });

        let record = SessionRecord {
            pid,
            port: request.port,
            project_file: project_file.clone(),
            started_at_ms: self.time_provider.now_millis(),
        };
        if let Err(e) = self.session_store.save(&record) {
            warn!(pid = %pid, error = %e, "Failed to persist session record");
        }

        info!(pid = %pid, port = %request.port, project_file = %project_file.display(), "Burp Suite started");

        Ok(StartOutcome::Started {
            pid,
            port: request.port,
            project_file,
        })
    }

    /// Config file handed to Burp via --config-file
    ///
    /// Without a caller-supplied file, one is generated so the requested port
    /// actually reaches the proxy listener. A supplied file wins over `port`.
    fn resolve_config_file(&self, request: &StartRequest) -> Result<PathBuf> {
        if let Some(path) = &request.config_file {
            match self.config_store.read(path) {
                Ok(config) if config.listener_port() != Some(request.port) => {
                    warn!(
                        config_file = %path.display(),
                        requested_port = %request.port,
                        config_port = ?config.listener_port(),
                        "Supplied config file sets a different proxy port; it takes precedence"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(config_file = %path.display(), error = %e, "Could not inspect supplied config file");
                }
            }
            return Ok(path.clone());
        }

        let path = self.settings.generated_config_file(&request.project_name);
        let config = ScanConfig::for_proxy_port(request.port)?;
        write_config(self.config_store.as_ref(), &path, &config)
    }
}

/// Write a configuration document through `store`
///
/// Needs no supervisor, so callers that only produce documents never touch
/// the JAR or the project directory. Returns `output_path`.
pub fn write_config(
    store: &dyn ConfigStore,
    output_path: &Path,
    config: &ScanConfig,
) -> Result<PathBuf> {
    store.write(output_path, config)?;

    info!(
        path = %output_path.display(),
        proxy_port = ?config.listener_port(),
        spider_threads = %config.spider.number_of_threads,
        scanner_threads = %config.scanner.active_scanning_engine.number_of_threads,
        "Wrote Burp configuration"
    );

    Ok(output_path.to_path_buf())
}

/// Two-phase termination: cooperative request, bounded poll, forced kill
async fn terminate(
    child: &mut dyn ChildProcess,
    time_provider: &dyn TimeProvider,
) -> std::result::Result<ExitState, ProcessError> {
    let pid = child.pid();

    if let Some(exit) = child.try_wait()? {
        debug!(pid = %pid, "Process had already exited");
        return Ok(exit);
    }

    info!(pid = %pid, "Sending SIGTERM to process group");
    child.signal_group(ProcessSignal::Terminate)?;

    for _ in 0..GRACEFUL_SHUTDOWN_POLL_ATTEMPTS {
        if let Some(exit) = child.try_wait()? {
            return Ok(exit);
        }
        time_provider.sleep(GRACEFUL_SHUTDOWN_POLL_INTERVAL).await;
    }

    if let Some(exit) = child.try_wait()? {
        return Ok(exit);
    }

    warn!(pid = %pid, "Process group did not exit after SIGTERM, sending SIGKILL");
    child.signal_group(ProcessSignal::Kill)?;
    child.wait().await
}

fn describe_exit(exit: &ExitState) -> String {
    match (exit.code, exit.signal) {
        (Some(code), _) => format!("exit code {}", code),
        (None, Some(signal)) => format!("killed by signal {}", signal),
        (None, None) => "exit status unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::port::config_store::mocks::InMemoryConfigStore;
    use crate::port::process_launcher::mocks::{MockChildBehavior, MockProcessLauncher};
    use crate::port::session_store::mocks::InMemorySessionStore;
    use crate::port::time_provider::mocks::MockTimeProvider;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        launcher: Arc<MockProcessLauncher>,
        clock: Arc<MockTimeProvider>,
        configs: Arc<InMemoryConfigStore>,
        sessions: Arc<InMemorySessionStore>,
        supervisor: Supervisor,
    }

    fn harness_with(behavior: MockChildBehavior, sessions: InMemorySessionStore) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("burpsuite.jar");
        std::fs::write(&jar, b"PK").unwrap();

        let launcher = Arc::new(MockProcessLauncher::new(behavior));
        let clock = Arc::new(MockTimeProvider::new(1_000));
        let configs = Arc::new(InMemoryConfigStore::new());
        let sessions = Arc::new(sessions);

        let supervisor = Supervisor::new(
            SupervisorSettings::new(&jar, dir.path().join("projects")),
            launcher.clone(),
            configs.clone(),
            sessions.clone(),
            clock.clone(),
        )
        .unwrap();

        Harness {
            dir,
            launcher,
            clock,
            configs,
            sessions,
            supervisor,
        }
    }

    fn harness(behavior: MockChildBehavior) -> Harness {
        harness_with(behavior, InMemorySessionStore::new())
    }

    #[test]
    fn test_missing_jar_fails_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(MockProcessLauncher::new(MockChildBehavior::ExitsOnTerminate));

        let result = Supervisor::new(
            SupervisorSettings::new(dir.path().join("missing.jar"), dir.path().join("p")),
            launcher.clone(),
            Arc::new(InMemoryConfigStore::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(MockTimeProvider::new(0)),
        );

        assert!(matches!(result, Err(AppError::ExecutableNotFound(_))));
        assert_eq!(launcher.spawn_count(), 0);
    }

    #[test]
    fn test_new_creates_nested_project_dir() {
        let h = harness(MockChildBehavior::ExitsOnTerminate);
        assert!(h.dir.path().join("projects").is_dir());
    }

    #[tokio::test]
    async fn test_start_launches_with_generated_config() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        let outcome = h
            .supervisor
            .start(StartRequest {
                port: 9191,
                ..Default::default()
            })
            .await;

        let project_dir = h.dir.path().join("projects");
        let StartOutcome::Started {
            pid,
            port,
            project_file,
        } = outcome
        else {
            panic!("expected Started");
        };
        assert_eq!(port, 9191);
        assert_eq!(project_file, project_dir.join("default.burp"));

        let generated = project_dir.join("default.config.json");
        let config = h.configs.get(&generated).expect("config generated");
        assert_eq!(config.listener_port(), Some(9191));

        let spec = h.launcher.last_spec().unwrap();
        assert!(spec
            .args
            .contains(&format!("--config-file={}", generated.display())));

        assert_eq!(h.clock.sleeps(), vec![START_SETTLE_DURATION]);

        let record = h.sessions.current().expect("session saved");
        assert_eq!(record.pid, pid);
        assert_eq!(record.port, 9191);
        assert_eq!(record.started_at_ms, 3_000);
    }

    #[tokio::test]
    async fn test_second_start_is_already_running() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        let first = h.supervisor.start(StartRequest::default()).await;
        let second = h.supervisor.start(StartRequest::default()).await;

        assert_eq!(
            second,
            StartOutcome::AlreadyRunning {
                pid: first.pid().unwrap(),
                port: 8080
            }
        );
        assert_eq!(h.launcher.spawn_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_without_process_sends_no_signals() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        assert_eq!(h.supervisor.stop().await, StopOutcome::NotRunning);
        assert!(h.launcher.signals().is_empty());
    }

    #[tokio::test]
    async fn test_start_then_stop_reports_stopped() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        let pid = h.supervisor.start(StartRequest::default()).await.pid().unwrap();
        assert_eq!(h.supervisor.get_status(), StatusReport::Running { pid });

        assert_eq!(h.supervisor.stop().await, StopOutcome::Stopped);
        assert_eq!(h.supervisor.get_status(), StatusReport::stopped());
        assert_eq!(h.launcher.signals(), vec![(pid, ProcessSignal::Terminate)]);
        assert!(h.sessions.current().is_none());
        assert!(h.supervisor.pid().is_none());
    }

    #[tokio::test]
    async fn test_stop_escalates_to_kill_after_poll_window() {
        let mut h = harness(MockChildBehavior::IgnoresTerminate);

        let pid = h.supervisor.start(StartRequest::default()).await.pid().unwrap();
        assert_eq!(h.supervisor.stop().await, StopOutcome::Stopped);

        assert_eq!(
            h.launcher.signals(),
            vec![(pid, ProcessSignal::Terminate), (pid, ProcessSignal::Kill)]
        );
        let poll_sleeps = h.clock.sleeps().len() - 1;
        assert_eq!(poll_sleeps, GRACEFUL_SHUTDOWN_POLL_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_stop_without_kill_when_exit_within_window() {
        let mut h = harness(MockChildBehavior::ExitsAfterPolls(3));

        let pid = h.supervisor.start(StartRequest::default()).await.pid().unwrap();
        assert_eq!(h.supervisor.stop().await, StopOutcome::Stopped);

        assert_eq!(h.launcher.signals(), vec![(pid, ProcessSignal::Terminate)]);
        assert_eq!(
            &h.clock.sleeps()[1..],
            &[Duration::from_secs(1); 3][..]
        );
    }

    #[tokio::test]
    async fn test_last_chance_check_avoids_kill() {
        let mut h = harness(MockChildBehavior::ExitsAfterPolls(GRACEFUL_SHUTDOWN_POLL_ATTEMPTS));

        h.supervisor.start(StartRequest::default()).await;
        assert_eq!(h.supervisor.stop().await, StopOutcome::Stopped);

        assert!(!h
            .launcher
            .signals()
            .iter()
            .any(|(_, s)| *s == ProcessSignal::Kill));
    }

    #[tokio::test]
    async fn test_immediate_exit_reports_stderr() {
        let mut h = harness(MockChildBehavior::ExitsImmediately {
            code: 1,
            stderr: "Error: Unable to access jarfile\n".to_string(),
        });

        let outcome = h.supervisor.start(StartRequest::default()).await;

        let StartOutcome::Failed { error } = outcome else {
            panic!("expected Failed");
        };
        assert!(error.contains("Unable to access jarfile"));
        assert!(error.contains("exit code 1"));
        assert_eq!(h.supervisor.get_status(), StatusReport::stopped());
        assert!(h.sessions.current().is_none());
    }

    #[tokio::test]
    async fn test_spawn_error_is_reported_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("burpsuite.jar");
        std::fs::write(&jar, b"PK").unwrap();

        let mut supervisor = Supervisor::new(
            SupervisorSettings::new(&jar, dir.path()),
            Arc::new(MockProcessLauncher::new_failing("No such file or directory")),
            Arc::new(InMemoryConfigStore::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(MockTimeProvider::new(0)),
        )
        .unwrap();

        let outcome = supervisor.start(StartRequest::default()).await;
        assert_eq!(
            outcome,
            StartOutcome::failed("Process error: Spawn failed: No such file or directory")
        );
    }

    #[tokio::test]
    async fn test_invalid_project_name_never_spawns() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        let outcome = h
            .supervisor
            .start(StartRequest {
                project_name: "../escape".to_string(),
                ..Default::default()
            })
            .await;

        assert!(matches!(outcome, StartOutcome::Failed { .. }));
        assert_eq!(h.launcher.spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_signal_failure_is_error_and_keeps_tracking() {
        let mut h = harness(MockChildBehavior::SignalFails("ESRCH: No such process".to_string()));

        let pid = h.supervisor.start(StartRequest::default()).await.pid().unwrap();
        let outcome = h.supervisor.stop().await;

        assert_eq!(
            outcome,
            StopOutcome::error("Signal failed: ESRCH: No such process")
        );
        assert_eq!(h.supervisor.pid(), Some(pid));
    }

    #[tokio::test]
    async fn test_external_exit_is_visible_in_status_and_restart() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        let pid = h.supervisor.start(StartRequest::default()).await.pid().unwrap();
        h.launcher.child(0).exit_externally(3);

        let expected = StatusReport::Stopped {
            return_code: Some(3),
            signal: None,
        };
        assert_eq!(h.supervisor.get_status(), expected);
        // status does not clear the handle
        assert_eq!(h.supervisor.get_status(), expected);
        assert_eq!(h.supervisor.pid(), Some(pid));

        let restarted = h.supervisor.start(StartRequest::default()).await;
        assert!(matches!(restarted, StartOutcome::Started { .. }));
        assert_ne!(restarted.pid(), Some(pid));
        assert_eq!(h.launcher.spawn_count(), 2);
    }

    #[tokio::test]
    async fn test_stop_after_external_exit_sends_nothing() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);

        h.supervisor.start(StartRequest::default()).await;
        h.launcher.child(0).exit_externally(0);

        assert_eq!(h.supervisor.stop().await, StopOutcome::Stopped);
        assert!(h.launcher.signals().is_empty());
    }

    #[tokio::test]
    async fn test_supplied_config_file_takes_precedence() {
        let mut h = harness(MockChildBehavior::ExitsOnTerminate);
        let supplied = h.dir.path().join("custom.json");
        h.supervisor.create_config(&supplied, 7070, 2, 2).unwrap();

        let outcome = h
            .supervisor
            .start(StartRequest {
                port: 8080,
                project_name: "audit".to_string(),
                config_file: Some(supplied.clone()),
            })
            .await;

        assert!(matches!(outcome, StartOutcome::Started { port: 8080, .. }));
        let spec = h.launcher.last_spec().unwrap();
        assert!(spec
            .args
            .contains(&format!("--config-file={}", supplied.display())));
        assert!(h
            .configs
            .get(&h.dir.path().join("projects/audit.config.json"))
            .is_none());
    }

    #[test]
    fn test_create_config_parameterizes_four_fields() {
        let h = harness(MockChildBehavior::ExitsOnTerminate);
        let path = h.dir.path().join("burp.json");

        let written = h.supervisor.create_config(&path, 9090, 4, 7).unwrap();
        assert_eq!(written, path);

        let config = h.supervisor.read_config(&path).unwrap();
        assert_eq!(config, ScanConfig::new(9090, 4, 7).unwrap());
        assert_eq!(config.spider.max_link_depth, 5);
    }

    #[test]
    fn test_create_config_rejects_zero_threads() {
        let h = harness(MockChildBehavior::ExitsOnTerminate);

        let result = h.supervisor.create_config(h.dir.path().join("x.json"), 8080, 0, 1);
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InvalidThreadCount { .. }))
        ));
    }

    #[tokio::test]
    async fn test_restore_session_adopts_live_process() {
        let record = SessionRecord {
            pid: 777,
            port: 8080,
            project_file: PathBuf::from("/p/default.burp"),
            started_at_ms: 1,
        };
        let mut h = harness_with(
            MockChildBehavior::ExitsOnTerminate,
            InMemorySessionStore::with_record(record),
        );
        h.launcher.allow_adopt(777, MockChildBehavior::ExitsOnTerminate);

        assert_eq!(h.supervisor.restore_session().unwrap(), Some(777));
        assert_eq!(h.supervisor.get_status(), StatusReport::Running { pid: 777 });

        assert_eq!(h.supervisor.stop().await, StopOutcome::Stopped);
        assert_eq!(h.launcher.signals(), vec![(777, ProcessSignal::Terminate)]);
        assert!(h.sessions.current().is_none());
    }

    #[test]
    fn test_restore_session_discards_stale_record() {
        let record = SessionRecord {
            pid: 778,
            port: 8080,
            project_file: PathBuf::from("/p/default.burp"),
            started_at_ms: 1,
        };
        let mut h = harness_with(
            MockChildBehavior::ExitsOnTerminate,
            InMemorySessionStore::with_record(record),
        );

        assert_eq!(h.supervisor.restore_session().unwrap(), None);
        assert!(h.sessions.current().is_none());
        assert_eq!(h.supervisor.get_status(), StatusReport::stopped());
    }

    #[test]
    fn test_restore_session_discards_unreadable_record() {
        let mut h = harness_with(
            MockChildBehavior::ExitsOnTerminate,
            InMemorySessionStore::corrupted(),
        );

        assert_eq!(h.supervisor.restore_session().unwrap(), None);
        assert!(!h.sessions.is_corrupt());
        assert_eq!(h.launcher.spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_unobservable_child_is_killed_and_not_tracked() {
        let mut h = harness(MockChildBehavior::WaitFails("waitpid: ECHILD".to_string()));

        let outcome = h.supervisor.start(StartRequest::default()).await;

        let StartOutcome::Failed { error } = outcome else {
            panic!("expected Failed");
        };
        assert!(error.contains("ECHILD"));
        assert_eq!(h.launcher.signals(), vec![(4001, ProcessSignal::Kill)]);
        assert!(h.supervisor.pid().is_none());
        assert!(h.sessions.current().is_none());
    }

    #[test]
    fn test_write_config_without_supervisor() {
        let store = InMemoryConfigStore::new();
        let path = PathBuf::from("/tmp/burp_config.json");
        let config = ScanConfig::new(8443, 3, 5).unwrap();

        let written = write_config(&store, &path, &config).unwrap();

        assert_eq!(written, path);
        assert_eq!(store.get(&path), Some(config));
    }
}
