//! Helpers for running the lint command with bounded output capture.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Build the command for `argv`, run from `workdir`.
///
/// On Windows the argv goes through `cmd /C` so `.cmd` shims such as `npx` resolve.
pub fn build_command(argv: &[String], workdir: &Path) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("no command specified"))?;

    let mut cmd = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(program);
        cmd
    } else {
        Command::new(program)
    };
    cmd.args(args).current_dir(workdir);
    Ok(cmd)
}

/// How often the waiting side checks for exit, overflow, and timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to keep draining pipes after the child was killed.
///
/// Grandchildren can hold the pipes open after their parent dies.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Notifications from the reader threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderSignal {
    /// A stream went past the output limit.
    Overflow,
    /// A reader thread is done with its stream.
    Finished,
}

#[derive(Debug, Default)]
struct Capture {
    bytes: Vec<u8>,
    truncated: usize,
    error: Option<String>,
}

type SharedCapture = Arc<Mutex<Capture>>;

/// Run a command to completion and capture stdout/stderr without risking pipe deadlocks.
///
/// Output is read concurrently while the child runs. Once either stream passes
/// `output_limit_bytes`, the child is killed and reaped right away; the kept prefix is
/// returned with a non-zero truncated count. With a `timeout`, the child is likewise
/// killed once it elapses.
#[instrument(skip_all, fields(program = ?cmd.get_program(), timeout = ?timeout, output_limit_bytes))]
pub fn run_command(
    mut cmd: Command,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            debug!(err = %e, "failed to spawn command");
            let program = cmd.get_program().to_string_lossy().into_owned();
            return Err(e).with_context(|| format!("spawn `{program}`"));
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let (signal_tx, signal_rx) = mpsc::channel();
    let stdout_capture = SharedCapture::default();
    let stderr_capture = SharedCapture::default();
    spawn_reader(
        stdout,
        output_limit_bytes,
        Arc::clone(&stdout_capture),
        signal_tx.clone(),
    );
    spawn_reader(
        stderr,
        output_limit_bytes,
        Arc::clone(&stderr_capture),
        signal_tx,
    );

    let started = Instant::now();
    let mut readers_done = 0;
    let mut overflowed = false;
    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child
            .wait_timeout(POLL_INTERVAL)
            .context("wait for command")?
        {
            break status;
        }
        while let Ok(signal) = signal_rx.try_recv() {
            match signal {
                ReaderSignal::Overflow => overflowed = true,
                ReaderSignal::Finished => readers_done += 1,
            }
        }
        if overflowed {
            warn!(output_limit_bytes, "output limit exceeded, killing");
            break kill_and_reap(&mut child)?;
        }
        if let Some(limit) = timeout
            && started.elapsed() >= limit
        {
            warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
            timed_out = true;
            break kill_and_reap(&mut child)?;
        }
    };

    let drain_deadline = (overflowed || timed_out).then(|| Instant::now() + DRAIN_GRACE);
    while readers_done < 2 {
        let signal = match drain_deadline {
            None => signal_rx.recv().ok(),
            Some(deadline) => signal_rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .ok(),
        };
        match signal {
            Some(ReaderSignal::Finished) => readers_done += 1,
            Some(ReaderSignal::Overflow) => {}
            None => break,
        }
    }
    if readers_done < 2 {
        debug!(readers_done, "pipes still open after kill, leaving readers behind");
    }

    let (stdout, stdout_truncated) = take_capture(&stdout_capture).context("capture stdout")?;
    let (stderr, stderr_truncated) = take_capture(&stderr_capture).context("capture stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

fn kill_and_reap(child: &mut Child) -> Result<ExitStatus> {
    child.kill().context("kill command")?;
    child.wait().context("wait command after kill")
}

fn spawn_reader<R: Read + Send + 'static>(
    reader: R,
    limit: usize,
    capture: SharedCapture,
    signal: Sender<ReaderSignal>,
) {
    thread::spawn(move || {
        match read_stream_limited(reader, limit, &capture) {
            Ok(true) => {
                let _ = signal.send(ReaderSignal::Overflow);
            }
            Ok(false) => {}
            Err(err) => {
                if let Ok(mut guard) = capture.lock() {
                    guard.error = Some(format!("{err:#}"));
                }
            }
        }
        let _ = signal.send(ReaderSignal::Finished);
    });
}

fn take_capture(capture: &SharedCapture) -> Result<(Vec<u8>, usize)> {
    let mut guard = capture
        .lock()
        .map_err(|_| anyhow!("output reader thread panicked"))?;
    if let Some(err) = guard.error.take() {
        return Err(anyhow!(err));
    }
    Ok((std::mem::take(&mut guard.bytes), guard.truncated))
}

/// Read `reader` into `capture` until EOF or until more than `limit` bytes arrive.
///
/// Returns `true` when the limit was exceeded; reading stops at that point.
fn read_stream_limited<R: Read>(
    mut reader: R,
    limit: usize,
    capture: &Mutex<Capture>,
) -> Result<bool> {
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            return Ok(false);
        }
        let mut guard = capture
            .lock()
            .map_err(|_| anyhow!("capture lock poisoned"))?;
        let remaining = limit.saturating_sub(guard.bytes.len());
        let keep = n.min(remaining);
        guard.bytes.extend_from_slice(&chunk[..keep]);
        if keep < n {
            guard.truncated += n - keep;
            return Ok(true);
        }
    }
}
