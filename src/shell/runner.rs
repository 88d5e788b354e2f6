//! Process execution with timeouts.
//!
//! Each call spawns exactly one child, reads its output on helper threads,
//! and does not return until the child has exited or been killed.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use super::command::{CommandSpec, Invocation};
use super::outcome::{CommandOutcome, Failure};
use super::platform::shell_program;

/// How often the child is polled once its output streams have closed.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to keep collecting output after a timeout kill.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// One line of child output, including its line terminator if it had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    /// The raw line as read from the pipe.
    pub fn raw(&self) -> &str {
        match self {
            OutputLine::Stdout(s) | OutputLine::Stderr(s) => s,
        }
    }

    /// The line without its trailing `\n`, `\r\n` or `\r`.
    pub fn content(&self) -> &str {
        self.raw().trim_end_matches(['\n', '\r'])
    }
}

/// Where stderr lines end up in the captured outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// stdout and stderr are captured separately.
    #[default]
    Separate,
    /// stderr is folded into stdout in receipt order; outcome stderr only
    /// carries runner messages (such as the timeout notice).
    Combined,
}

/// Executes command specs. The seam the pipeline runs through.
pub trait CommandRunner {
    /// Run to completion or timeout, buffering output.
    fn run(&self, spec: &CommandSpec) -> CommandOutcome;

    /// Run with stdout and stderr combined, handing each line (without its
    /// terminator) to `on_line` as soon as it is read.
    fn run_live(&self, spec: &CommandSpec, on_line: &mut dyn FnMut(&str)) -> CommandOutcome;
}

/// Runs commands as real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome {
        run(spec)
    }

    fn run_live(&self, spec: &CommandSpec, on_line: &mut dyn FnMut(&str)) -> CommandOutcome {
        run_streaming(spec, StreamMode::Combined, &mut |line| on_line(line.content()))
    }
}

/// Run a command, buffering stdout and stderr separately.
pub fn run(spec: &CommandSpec) -> CommandOutcome {
    run_streaming(spec, StreamMode::Separate, &mut |_| {})
}

/// Run a command, calling `on_line` for every line as it arrives.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`; concatenating their raw text
/// reproduces the output byte for byte.
///
/// Never fails: spawn errors, timeouts and non-zero exits are all reported
/// through the returned [`CommandOutcome`].
///
/// Returns once the direct child has exited, even if a background process
/// it started still holds the output pipes. That process is left running,
/// and the reader threads stay blocked on its pipes until it exits or
/// closes them; output it writes after the return is discarded.
pub fn run_streaming(
    spec: &CommandSpec,
    mode: StreamMode,
    on_line: &mut dyn FnMut(&OutputLine),
) -> CommandOutcome {
    let start = Instant::now();

    let child = match build_command(spec).spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command = %spec, error = %e, "failed to start command");
            return CommandOutcome::start_failure(
                format!("Failed to start '{}': {}", spec, e),
                start.elapsed(),
            );
        }
    };

    let mut child = Supervised::new(child);
    tracing::debug!(command = %spec, pid = child.id(), timeout = ?spec.timeout(), "spawned");

    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = child.stdout_pipe() {
        spawn_reader(stdout, tx.clone(), OutputLine::Stdout);
    }
    if let Some(stderr) = child.stderr_pipe() {
        spawn_reader(stderr, tx.clone(), OutputLine::Stderr);
    }
    drop(tx);

    let deadline = start + spec.timeout();
    let mut capture = Capture::new(mode);

    match supervise(&mut child, &rx, deadline, &mut capture, on_line) {
        Waited::Exited(status) => {
            let duration = start.elapsed();
            tracing::debug!(command = %spec, status = ?status, ?duration, "command exited");
            let (stdout, stderr) = capture.finish();
            outcome_from_status(status, stdout, stderr, duration)
        }
        Waited::TimedOut => {
            tracing::warn!(command = %spec, timeout = ?spec.timeout(), "command timed out, killing");
            child.terminate();
            drain(&rx, &mut capture, on_line);
            let (stdout, stderr) = capture.finish();
            CommandOutcome::timed_out(spec.timeout(), stdout, stderr, start.elapsed())
        }
        Waited::Error(e) => {
            tracing::warn!(command = %spec, error = %e, "failed to wait on command");
            child.terminate();
            let (stdout, mut stderr) = capture.finish();
            stderr.push_str(&format!("Failed to wait on '{}': {}", spec, e));
            CommandOutcome::failed(Failure::WaitError, stdout, stderr, start.elapsed())
        }
    }
}

enum Waited {
    Exited(ExitStatus),
    TimedOut,
    Error(std::io::Error),
}

/// Read output until both pipes close, then reap the child; give up at
/// `deadline`.
fn supervise(
    child: &mut Supervised,
    rx: &Receiver<OutputLine>,
    deadline: Instant,
    capture: &mut Capture,
    on_line: &mut dyn FnMut(&OutputLine),
) -> Waited {
    let mut streams_open = true;

    loop {
        let now = Instant::now();
        if now >= deadline {
            return Waited::TimedOut;
        }
        let remaining = deadline - now;

        if streams_open {
            match rx.recv_timeout(remaining.min(POLL_INTERVAL)) {
                Ok(line) => {
                    on_line(&line);
                    capture.push(line);
                }
                // A background grandchild may hold the pipes after the child exits.
                Err(RecvTimeoutError::Timeout) => match child.try_wait() {
                    Ok(Some(status)) => {
                        drain(rx, capture, on_line);
                        return Waited::Exited(status);
                    }
                    Ok(None) => {}
                    Err(e) => return Waited::Error(e),
                },
                Err(RecvTimeoutError::Disconnected) => streams_open = false,
            }
            continue;
        }

        match child.try_wait() {
            Ok(Some(status)) => return Waited::Exited(status),
            Ok(None) => thread::sleep(remaining.min(POLL_INTERVAL)),
            Err(e) => return Waited::Error(e),
        }
    }
}

/// Collect lines still buffered in the pipes after a kill.
fn drain(rx: &Receiver<OutputLine>, capture: &mut Capture, on_line: &mut dyn FnMut(&OutputLine)) {
    let grace_end = Instant::now() + DRAIN_GRACE;
    loop {
        let remaining = grace_end.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        match rx.recv_timeout(remaining) {
            Ok(line) => {
                on_line(&line);
                capture.push(line);
            }
            Err(_) => return,
        }
    }
}

fn spawn_reader<R>(source: R, tx: Sender<OutputLine>, wrap: fn(String) -> OutputLine)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match read_line(&mut reader, &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(wrap(line)).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Read one line ending in `\n`, `\r\n` or a lone `\r` into `buf`.
///
/// Tools that redraw progress in place separate updates with `\r`, so a
/// `\r` ends the line as soon as it is read. When the `\n` of a `\r\n`
/// pair has not arrived yet, it comes back later as a line of its own.
fn read_line<R: Read>(reader: &mut BufReader<R>, buf: &mut Vec<u8>) -> io::Result<usize> {
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(buf.len());
        }

        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                let carriage_return = available[end] == b'\r';
                buf.extend_from_slice(&available[..=end]);
                reader.consume(end + 1);
                if carriage_return && reader.buffer().first() == Some(&b'\n') {
                    buf.push(b'\n');
                    reader.consume(1);
                }
                return Ok(buf.len());
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut cmd = match spec.invocation() {
        Invocation::Argv(args) => {
            let mut cmd = Command::new(&args[0]);
            cmd.args(&args[1..]);
            cmd
        }
        Invocation::Shell(script) => {
            let (shell, flag) = shell_program();
            let mut cmd = Command::new(shell);
            cmd.arg(flag).arg(script);
            cmd
        }
    };

    if let Some(cwd) = spec.cwd() {
        cmd.current_dir(cwd);
    }
    cmd.envs(spec.env());

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    // Own process group, so a timeout kill reaches shell-mode grandchildren.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd
}

fn outcome_from_status(
    status: ExitStatus,
    stdout: String,
    stderr: String,
    duration: Duration,
) -> CommandOutcome {
    match status.code() {
        Some(code) => CommandOutcome::exited(code, stdout, stderr, duration),
        None => CommandOutcome::failed(
            Failure::Signaled {
                signal: exit_signal(&status),
            },
            stdout,
            stderr,
            duration,
        ),
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Accumulates captured output according to the stream mode.
struct Capture {
    mode: StreamMode,
    stdout: String,
    stderr: String,
}

impl Capture {
    fn new(mode: StreamMode) -> Self {
        Self {
            mode,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn push(&mut self, line: OutputLine) {
        match (line, self.mode) {
            (OutputLine::Stdout(s), _) | (OutputLine::Stderr(s), StreamMode::Combined) => {
                self.stdout.push_str(&s)
            }
            (OutputLine::Stderr(s), StreamMode::Separate) => self.stderr.push_str(&s),
        }
    }

    fn finish(self) -> (String, String) {
        (self.stdout, self.stderr)
    }
}

/// A child that is killed and reaped on drop unless it was already reaped.
struct Supervised {
    child: Child,
    reaped: bool,
}

impl Supervised {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn id(&self) -> u32 {
        self.child.id()
    }

    fn stdout_pipe(&mut self) -> Option<std::process::ChildStdout> {
        self.child.stdout.take()
    }

    fn stderr_pipe(&mut self) -> Option<std::process::ChildStderr> {
        self.child.stderr.take()
    }

    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    /// Kill the child's process group and reap the child.
    fn terminate(&mut self) {
        if self.reaped {
            return;
        }

        #[cfg(unix)]
        {
            if let Ok(pgid) = libc::pid_t::try_from(self.child.id()) {
                // SAFETY: kill(2) only sends a signal; the group was created
                // for this child by `process_group(0)`.
                unsafe {
                    libc::kill(-pgid, libc::SIGKILL);
                }
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }
}

impl Drop for Supervised {
    fn drop(&mut self) {
        self.terminate();
    }
}
