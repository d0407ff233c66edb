//! Subprocess runner used by every backend.
//!
//! All failures — spawn errors, missing binaries, timeouts — collapse into
//! an [`ExecResult`] with [`FAILURE_CODE`] and a message on stderr, so
//! handler code deals with one shape and never panics on a missing tool.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Exit code reported when the command could not run at all.
pub const FAILURE_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Process exit code, or [`FAILURE_CODE`] for spawn failure/timeout.
    pub code: i32,
    /// Captured stdout (`None` when output was passed through).
    pub stdout: Option<String>,
    /// Captured stderr, or the failure message.
    pub stderr: Option<String>,
}

impl ExecResult {
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            code: FAILURE_CODE,
            stdout: None,
            stderr: Some(message.into()),
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }

    /// Trimmed stdout, empty when nothing was captured.
    #[must_use]
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.as_deref().map_or("", str::trim)
    }

    /// Trimmed stderr, empty when nothing was captured.
    #[must_use]
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.as_deref().map_or("", str::trim)
    }
}

/// Execution knobs. Capture is the default; interactive commands
/// (editors, `bluetoothctl` pairing) pass output through instead.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub capture: bool,
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            capture: true,
            timeout: None,
        }
    }
}

impl RunOptions {
    /// Inherit stdio so the child can interact with the terminal.
    #[must_use]
    pub const fn passthrough() -> Self {
        Self {
            capture: false,
            timeout: None,
        }
    }

    /// Capture output but give up after `limit`.
    #[must_use]
    pub const fn with_timeout(limit: Duration) -> Self {
        Self {
            capture: true,
            timeout: Some(limit),
        }
    }
}

/// Seam between handlers and the operating system; tests substitute
/// recording or scripted implementations.
pub trait Runner {
    fn run(&self, argv: &[String], opts: RunOptions) -> ExecResult;
}

/// Production runner backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, argv: &[String], opts: RunOptions) -> ExecResult {
        let Some((program, args)) = argv.split_first() else {
            return ExecResult::failure("empty command line");
        };
        log::debug!("exec: {}", argv.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args);
        if opts.capture {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return ExecResult::failure(format!("command not found: {program}"));
            }
            Err(err) => return ExecResult::failure(format!("failed to run {program}: {err}")),
        };

        // Drain pipes on threads so a chatty child cannot deadlock the
        // timeout poll below on a full pipe buffer.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let status = match opts.timeout {
            None => child.wait(),
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break Ok(status),
                        Ok(None) if Instant::now() >= deadline => {
                            let _ = child.kill();
                            let _ = child.wait();
                            return ExecResult::failure(format!(
                                "command timed out after {:.1}s: {program}",
                                limit.as_secs_f64()
                            ));
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(err) => break Err(err),
                    }
                }
            }
        };

        let status = match status {
            Ok(status) => status,
            Err(err) => return ExecResult::failure(format!("failed to wait on {program}: {err}")),
        };

        ExecResult {
            // Signal death has no code; fold it into the failure sentinel.
            code: status.code().unwrap_or(FAILURE_CODE),
            stdout: stdout_reader.map(join_reader),
            stderr: stderr_reader.map(join_reader),
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = stream.read_to_string(&mut buf);
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Async variant for callers already on a tokio runtime. Identical result
/// shape; dropping the future kills the child (`kill_on_drop`).
pub async fn run_async(argv: &[String], opts: RunOptions) -> ExecResult {
    let Some((program, args)) = argv.split_first() else {
        return ExecResult::failure("empty command line");
    };
    log::debug!("exec (async): {}", argv.join(" "));

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).kill_on_drop(true);
    if opts.capture {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
    }

    let spawned = match cmd.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ExecResult::failure(format!("command not found: {program}"));
        }
        Err(err) => return ExecResult::failure(format!("failed to run {program}: {err}")),
    };

    let waited = spawned.wait_with_output();
    let output = match opts.timeout {
        Some(limit) => match tokio::time::timeout(limit, waited).await {
            Ok(result) => result,
            Err(_) => {
                return ExecResult::failure(format!(
                    "command timed out after {:.1}s: {program}",
                    limit.as_secs_f64()
                ));
            }
        },
        None => waited.await,
    };

    match output {
        Ok(output) => ExecResult {
            code: output.status.code().unwrap_or(FAILURE_CODE),
            stdout: opts
                .capture
                .then(|| String::from_utf8_lossy(&output.stdout).into_owned()),
            stderr: opts
                .capture
                .then(|| String::from_utf8_lossy(&output.stderr).into_owned()),
        },
        Err(err) => ExecResult::failure(format!("failed to wait on {program}: {err}")),
    }
}

/// Build an argv vector from string literals.
#[must_use]
pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_on_success() {
        let result = SystemRunner.run(&argv(&["echo", "hello"]), RunOptions::default());
        assert!(result.success());
        assert_eq!(result.stdout_trimmed(), "hello");
    }

    #[test]
    fn nonzero_exit_is_reported_not_raised() {
        let result = SystemRunner.run(&argv(&["false"]), RunOptions::default());
        assert_eq!(result.code, 1);
    }

    #[test]
    fn missing_binary_yields_failure_sentinel() {
        let result = SystemRunner.run(
            &argv(&["definitely-not-a-real-binary-i3c"]),
            RunOptions::default(),
        );
        assert_eq!(result.code, FAILURE_CODE);
        assert!(result.stderr_trimmed().contains("not found"));
        assert!(result.stdout.is_none());
    }

    #[test]
    fn empty_argv_yields_failure_sentinel() {
        let result = SystemRunner.run(&[], RunOptions::default());
        assert_eq!(result.code, FAILURE_CODE);
        assert!(!result.stderr_trimmed().is_empty());
    }

    #[test]
    fn timeout_kills_child_within_bounds() {
        let started = Instant::now();
        let result = SystemRunner.run(
            &argv(&["sleep", "30"]),
            RunOptions::with_timeout(Duration::from_millis(200)),
        );
        let elapsed = started.elapsed();
        assert_eq!(result.code, FAILURE_CODE);
        assert!(result.stderr_trimmed().contains("timed out"));
        assert!(
            elapsed < Duration::from_secs(5),
            "timeout should not wait for the child: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn async_captures_stdout() {
        let result = run_async(&argv(&["echo", "async"]), RunOptions::default()).await;
        assert!(result.success());
        assert_eq!(result.stdout_trimmed(), "async");
    }

    #[tokio::test]
    async fn async_timeout_kills_child_within_bounds() {
        let started = Instant::now();
        let result = run_async(
            &argv(&["sleep", "30"]),
            RunOptions::with_timeout(Duration::from_millis(200)),
        )
        .await;
        let elapsed = started.elapsed();
        assert_eq!(result.code, FAILURE_CODE);
        assert!(result.stderr_trimmed().contains("timed out"));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn async_missing_binary_yields_failure_sentinel() {
        let result = run_async(
            &argv(&["definitely-not-a-real-binary-i3c"]),
            RunOptions::default(),
        )
        .await;
        assert_eq!(result.code, FAILURE_CODE);
        assert!(result.stderr_trimmed().contains("not found"));
    }
}
