// Process Launcher Port (ADR-002)
// Abstraction over spawning, signalling and reaping the external application

use crate::domain::{ExitState, LaunchSpec, ProcessSignal};
use async_trait::async_trait;
use thiserror::Error;

/// Process errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Signal failed: {0}")]
    SignalFailed(String),

    #[error("Wait failed: {0}")]
    WaitFailed(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

/// Handle to one running (or finished) child process
///
/// Implementations:
/// - SpawnedProcess: child spawned by this process (exit status available)
/// - AdoptedProcess: child of an earlier invocation, tracked by pid only
#[async_trait]
pub trait ChildProcess: Send {
    /// OS process id (also the process group id)
    fn pid(&self) -> u32;

    /// Non-blocking exit check. `Ok(None)` means still running.
    fn try_wait(&mut self) -> Result<Option<ExitState>, ProcessError>;

    /// Block until the process has exited
    async fn wait(&mut self) -> Result<ExitState, ProcessError>;

    /// Send a signal to the whole process group of this child
    ///
    /// # Errors
    /// - ProcessError::SignalFailed if the group no longer exists or the
    ///   signal cannot be delivered
    fn signal_group(&self, signal: ProcessSignal) -> Result<(), ProcessError>;

    /// Error output captured so far (tail only)
    async fn captured_output(&mut self) -> String;
}

/// Process Launcher trait
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the process described by `spec` in its own process group
    ///
    /// # Errors
    /// - ProcessError::SpawnFailed if the program cannot be executed
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ChildProcess>, ProcessError>;

    /// Re-attach to a process started by an earlier invocation
    ///
    /// Returns `None` when no live process with that pid exists.
    fn adopt(&self, pid: u32) -> Option<Box<dyn ChildProcess>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const SIGTERM: i32 = 15;
    const SIGKILL: i32 = 9;

    /// Mock child behavior
    #[derive(Debug, Clone)]
    pub enum MockChildBehavior {
        /// Exits as soon as SIGTERM arrives
        ExitsOnTerminate,
        /// Keeps running after SIGTERM for N liveness checks, then exits
        ExitsAfterPolls(usize),
        /// Ignores SIGTERM; only SIGKILL ends it
        IgnoresTerminate,
        /// Already dead when first checked, with this stderr
        ExitsImmediately { code: i32, stderr: String },
        /// Every signal delivery fails with this message
        SignalFails(String),
        /// Exit state can never be observed; liveness checks fail with this message
        WaitFails(String),
    }

    #[derive(Debug)]
    struct ChildState {
        behavior: MockChildBehavior,
        exit: Option<ExitState>,
        terminate_requested: bool,
        polls_after_terminate: usize,
    }

    /// Shared view of one mock child (for driving and inspecting it from tests)
    #[derive(Clone)]
    pub struct MockChildControl {
        pid: u32,
        state: Arc<Mutex<ChildState>>,
        signals: Arc<Mutex<Vec<(u32, ProcessSignal)>>>,
    }

    impl MockChildControl {
        /// Simulate the process exiting on its own
        pub fn exit_externally(&self, code: i32) {
            self.state.lock().unwrap().exit = Some(ExitState::with_code(code));
        }

        pub fn has_exited(&self) -> bool {
            self.state.lock().unwrap().exit.is_some()
        }
    }

    struct MockChild {
        control: MockChildControl,
    }

    #[async_trait]
    impl ChildProcess for MockChild {
        fn pid(&self) -> u32 {
            self.control.pid
        }

        fn try_wait(&mut self) -> Result<Option<ExitState>, ProcessError> {
            let mut guard = self.control.state.lock().unwrap();
            let state = &mut *guard;
            if let MockChildBehavior::WaitFails(msg) = &state.behavior {
                return Err(ProcessError::WaitFailed(msg.clone()));
            }
            if state.exit.is_none() && state.terminate_requested {
                if let MockChildBehavior::ExitsAfterPolls(n) = state.behavior {
                    state.polls_after_terminate += 1;
                    if state.polls_after_terminate > n {
                        state.exit = Some(ExitState::with_signal(SIGTERM));
                    }
                }
            }
            Ok(state.exit)
        }

        async fn wait(&mut self) -> Result<ExitState, ProcessError> {
            // A mock that never received SIGKILL would block forever; fail loudly instead
            self.control
                .state
                .lock()
                .unwrap()
                .exit
                .ok_or_else(|| ProcessError::WaitFailed("mock child still running".to_string()))
        }

        fn signal_group(&self, signal: ProcessSignal) -> Result<(), ProcessError> {
            let mut guard = self.control.state.lock().unwrap();
            let state = &mut *guard;
            if let MockChildBehavior::SignalFails(msg) = &state.behavior {
                return Err(ProcessError::SignalFailed(msg.clone()));
            }

            self.control
                .signals
                .lock()
                .unwrap()
                .push((self.control.pid, signal));

            if state.exit.is_some() {
                return Ok(());
            }
            match (signal, &state.behavior) {
                (ProcessSignal::Kill, _) => state.exit = Some(ExitState::with_signal(SIGKILL)),
                (ProcessSignal::Terminate, MockChildBehavior::ExitsOnTerminate) => {
                    state.exit = Some(ExitState::with_signal(SIGTERM))
                }
                (ProcessSignal::Terminate, _) => state.terminate_requested = true,
            }
            Ok(())
        }

        async fn captured_output(&mut self) -> String {
            let state = self.control.state.lock().unwrap();
            let stderr = match &state.behavior {
                MockChildBehavior::ExitsImmediately { stderr, .. } => stderr.clone(),
                _ => String::new(),
            };
            stderr
        }
    }

    /// Mock Process Launcher for testing
    ///
    /// Records every launch and every signal; every child it hands out
    /// follows the behavior given to `new`.
    pub struct MockProcessLauncher {
        behavior: Mutex<MockChildBehavior>,
        spawn_error: Mutex<Option<String>>,
        next_pid: Mutex<u32>,
        children: Mutex<Vec<MockChildControl>>,
        adoptable: Mutex<HashMap<u32, MockChildBehavior>>,
        launched: Mutex<Vec<LaunchSpec>>,
        signals: Arc<Mutex<Vec<(u32, ProcessSignal)>>>,
    }

    impl MockProcessLauncher {
        pub fn new(behavior: MockChildBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                spawn_error: Mutex::new(None),
                next_pid: Mutex::new(4000),
                children: Mutex::new(Vec::new()),
                adoptable: Mutex::new(HashMap::new()),
                launched: Mutex::new(Vec::new()),
                signals: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            let launcher = Self::new(MockChildBehavior::ExitsOnTerminate);
            *launcher.spawn_error.lock().unwrap() = Some(message.into());
            launcher
        }

        /// Make `pid` look alive to `adopt`
        pub fn allow_adopt(&self, pid: u32, behavior: MockChildBehavior) {
            self.adoptable.lock().unwrap().insert(pid, behavior);
        }

        pub fn spawn_count(&self) -> usize {
            self.launched.lock().unwrap().len()
        }

        pub fn last_spec(&self) -> Option<LaunchSpec> {
            self.launched.lock().unwrap().last().cloned()
        }

        pub fn child(&self, index: usize) -> MockChildControl {
            self.children.lock().unwrap()[index].clone()
        }

        /// All signals delivered so far, as (pid, signal)
        pub fn signals(&self) -> Vec<(u32, ProcessSignal)> {
            self.signals.lock().unwrap().clone()
        }

        fn make_child(&self, pid: u32, behavior: MockChildBehavior) -> MockChildControl {
            let exit = match &behavior {
                MockChildBehavior::ExitsImmediately { code, .. } => Some(ExitState::with_code(*code)),
                _ => None,
            };
            let control = MockChildControl {
                pid,
                state: Arc::new(Mutex::new(ChildState {
                    behavior,
                    exit,
                    terminate_requested: false,
                    polls_after_terminate: 0,
                })),
                signals: self.signals.clone(),
            };
            self.children.lock().unwrap().push(control.clone());
            control
        }
    }

    impl ProcessLauncher for MockProcessLauncher {
        fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ChildProcess>, ProcessError> {
            if let Some(msg) = self.spawn_error.lock().unwrap().clone() {
                return Err(ProcessError::SpawnFailed(msg));
            }
            self.launched.lock().unwrap().push(spec.clone());

            let pid = {
                let mut next = self.next_pid.lock().unwrap();
                *next += 1;
                *next
            };
            let behavior = self.behavior.lock().unwrap().clone();
            let control = self.make_child(pid, behavior);
            Ok(Box::new(MockChild { control }))
        }

        fn adopt(&self, pid: u32) -> Option<Box<dyn ChildProcess>> {
            let behavior = self.adoptable.lock().unwrap().remove(&pid)?;
            let control = self.make_child(pid, behavior);
            Some(Box::new(MockChild { control }))
        }
    }
}
