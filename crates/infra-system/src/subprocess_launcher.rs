// Subprocess launcher implementation (ADR-002)
// reason: tokio for child management and output draining, nix for process-group signals
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use burp_headless_core::application::constants::CAPTURED_OUTPUT_MAX_LINES;
use burp_headless_core::domain::{ExitState, LaunchSpec, OutputCapture, ProcessSignal};
use burp_headless_core::port::{ChildProcess, ProcessError, ProcessLauncher};

/// How long `captured_output` waits for the drain tasks to hit EOF
const DRAIN_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Liveness poll interval while waiting on an adopted (non-child) process
const ADOPTED_WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// Subprocess launcher
/// Spawns the child as leader of a new process group so the whole tree can be signalled
#[derive(Debug, Default, Clone, Copy)]
pub struct SubprocessLauncher;

impl SubprocessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for SubprocessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ChildProcess>, ProcessError> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).stdin(Stdio::null());

        #[cfg(unix)]
        command.process_group(0);

        let mut log_offset = 0;
        match &spec.output {
            OutputCapture::Piped => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputCapture::LogFile(path) => {
                let (stdout, stderr, offset) = open_log_file(path)?;
                command.stdout(stdout).stderr(stderr);
                log_offset = offset;
            }
        }

        let mut child = command.spawn().map_err(|e| {
            ProcessError::SpawnFailed(format!("{}: {}", spec.program.display(), e))
        })?;
        let pid = child.id().ok_or_else(|| {
            ProcessError::SpawnFailed("child exited before its pid could be read".to_string())
        })?;

        info!(pid = %pid, program = %spec.program.display(), "Spawned child process");

        let output = match &spec.output {
            OutputCapture::Piped => {
                let tail = OutputTail::new(CAPTURED_OUTPUT_MAX_LINES);
                let mut drains = Vec::with_capacity(2);
                if let Some(stdout) = child.stdout.take() {
                    drains.push(drain(stdout, pid, "stdout", None));
                }
                if let Some(stderr) = child.stderr.take() {
                    drains.push(drain(stderr, pid, "stderr", Some(tail.clone())));
                }
                CapturedOutput::Piped { tail, drains }
            }
            OutputCapture::LogFile(path) => CapturedOutput::LogFile {
                path: path.clone(),
                offset: log_offset,
            },
        };

        Ok(Box::new(SpawnedProcess { child, pid, output }))
    }

    fn adopt(&self, pid: u32) -> Option<Box<dyn ChildProcess>> {
        if !is_alive(pid) {
            return None;
        }
        if !leads_own_group(pid) {
            // pid was recycled by an unrelated process
            warn!(pid = %pid, "Process is alive but not a group leader, refusing to adopt");
            return None;
        }

        debug!(pid = %pid, "Adopting existing process");
        Some(Box::new(AdoptedProcess { pid, exit: None }))
    }
}

/// Opens the log for appending; the returned offset is where this run's output begins
fn open_log_file(path: &Path) -> Result<(Stdio, Stdio, u64), ProcessError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ProcessError::SpawnFailed(format!("cannot open log file {}: {}", path.display(), e))
        })?;
    let offset = file.metadata().map(|m| m.len()).map_err(|e| {
        ProcessError::SpawnFailed(format!("cannot stat log file {}: {}", path.display(), e))
    })?;
    let stderr = file.try_clone().map_err(|e| {
        ProcessError::SpawnFailed(format!("cannot share log file {}: {}", path.display(), e))
    })?;
    Ok((Stdio::from(file), Stdio::from(stderr), offset))
}

/// Bounded buffer of the most recent output lines
#[derive(Clone)]
struct OutputTail {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl OutputTail {
    fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn push(&self, line: String) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    fn joined(&self) -> String {
        match self.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect::<Vec<_>>().join("\n"),
            Err(_) => String::new(),
        }
    }
}

/// Read a child pipe to EOF so the child never blocks on a full pipe
fn drain<R>(reader: R, pid: u32, stream: &'static str, tail: Option<OutputTail>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    debug!(pid = %pid, stream = stream, line = %line, "child output");
                    if let Some(tail) = &tail {
                        tail.push(line);
                    }
                }
                Err(e) => {
                    debug!(pid = %pid, stream = stream, error = %e, "Stopped reading child output");
                    break;
                }
            }
        }
    })
}

enum CapturedOutput {
    Piped {
        tail: OutputTail,
        drains: Vec<JoinHandle<()>>,
    },
    /// Output of earlier runs sits before `offset`
    LogFile { path: PathBuf, offset: u64 },
}

/// Child spawned by this process; exit status comes from the OS wait
pub struct SpawnedProcess {
    child: Child,
    pid: u32,
    output: CapturedOutput,
}

#[async_trait]
impl ChildProcess for SpawnedProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_wait(&mut self) -> Result<Option<ExitState>, ProcessError> {
        self.child
            .try_wait()
            .map(|status| status.map(exit_state))
            .map_err(|e| ProcessError::WaitFailed(e.to_string()))
    }

    async fn wait(&mut self) -> Result<ExitState, ProcessError> {
        self.child
            .wait()
            .await
            .map(exit_state)
            .map_err(|e| ProcessError::WaitFailed(e.to_string()))
    }

    fn signal_group(&self, signal: ProcessSignal) -> Result<(), ProcessError> {
        signal_process_group(self.pid, signal)
    }

    async fn captured_output(&mut self) -> String {
        match &mut self.output {
            CapturedOutput::Piped { tail, drains } => {
                for handle in drains.drain(..) {
                    let _ = tokio::time::timeout(DRAIN_FLUSH_TIMEOUT, handle).await;
                }
                tail.joined()
            }
            CapturedOutput::LogFile { path, offset } => read_log_tail(path, *offset).await,
        }
    }
}

async fn read_log_tail(path: &Path, offset: u64) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let start = usize::try_from(offset).unwrap_or(usize::MAX).min(bytes.len());
            let text = String::from_utf8_lossy(&bytes[start..]);
            let lines: Vec<&str> = text.lines().collect();
            let start = lines.len().saturating_sub(CAPTURED_OUTPUT_MAX_LINES);
            lines[start..].join("\n")
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read child log file");
            String::new()
        }
    }
}

/// Process started by an earlier invocation; only its pid is known
pub struct AdoptedProcess {
    pid: u32,
    exit: Option<ExitState>,
}

#[async_trait]
impl ChildProcess for AdoptedProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_wait(&mut self) -> Result<Option<ExitState>, ProcessError> {
        if self.exit.is_none() && !is_alive(self.pid) {
            self.exit = Some(ExitState::unknown());
        }
        Ok(self.exit)
    }

    async fn wait(&mut self) -> Result<ExitState, ProcessError> {
        loop {
            if let Some(exit) = self.try_wait()? {
                return Ok(exit);
            }
            tokio::time::sleep(ADOPTED_WAIT_INTERVAL).await;
        }
    }

    fn signal_group(&self, signal: ProcessSignal) -> Result<(), ProcessError> {
        signal_process_group(self.pid, signal)
    }

    async fn captured_output(&mut self) -> String {
        String::new()
    }
}

fn exit_state(status: ExitStatus) -> ExitState {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitState::with_signal(signal);
        }
    }

    match status.code() {
        Some(code) => ExitState::with_code(code),
        None => ExitState::unknown(),
    }
}

/// Send `signal` to the process group `pid` belongs to
#[cfg(unix)]
fn signal_process_group(pid: u32, signal: ProcessSignal) -> Result<(), ProcessError> {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::{getpgid, Pid};

    let pgid = getpgid(Some(Pid::from_raw(pid as i32)))
        .map_err(|e| ProcessError::SignalFailed(format!("getpgid({}) failed: {}", pid, e)))?;

    let sig = match signal {
        ProcessSignal::Terminate => Signal::SIGTERM,
        ProcessSignal::Kill => Signal::SIGKILL,
    };

    debug!(pid = %pid, pgid = %pgid, signal = %signal, "Signalling process group");
    killpg(pgid, sig).map_err(|e| {
        ProcessError::SignalFailed(format!("{} to process group {} failed: {}", signal, pgid, e))
    })
}

#[cfg(windows)]
fn signal_process_group(pid: u32, signal: ProcessSignal) -> Result<(), ProcessError> {
    // Windows: taskkill /T walks the process tree; /F only for the forced phase
    let pid_arg = pid.to_string();
    let mut args = vec!["/T", "/PID", pid_arg.as_str()];
    if signal == ProcessSignal::Kill {
        args.insert(0, "/F");
    }

    let output = std::process::Command::new("taskkill")
        .args(&args)
        .output()
        .map_err(|e| ProcessError::SignalFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(ProcessError::SignalFailed(format!(
            "taskkill failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn signal_process_group(_pid: u32, signal: ProcessSignal) -> Result<(), ProcessError> {
    Err(ProcessError::Unsupported(format!("{} to a process group", signal)))
}

fn is_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        // No signal: existence/permission check only. EPERM still means alive.
        match kill(Pid::from_raw(pid as i32), None) {
            Ok(()) => true,
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    #[cfg(windows)]
    {
        let output = std::process::Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid), "/NH"])
            .output();

        if let Ok(output) = output {
            String::from_utf8_lossy(&output.stdout).contains(&pid.to_string())
        } else {
            false
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = pid;
        false
    }
}

/// Processes this launcher spawns are always their own group leader
fn leads_own_group(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::unistd::{getpgid, Pid};

        let pid = Pid::from_raw(pid as i32);
        matches!(getpgid(Some(pid)), Ok(pgid) if pgid == pid)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}
