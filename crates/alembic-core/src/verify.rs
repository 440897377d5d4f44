//! Post-install smoke testing.
//!
//! Runs the recipe's [`TestProcedure`] against the produced binary: version
//! check, server spawn on a fresh control socket, bounded wait for the
//! socket to materialize, then a client query that must print the expected
//! "no server running" diagnostic. Every assertion failure is reported as
//! structured data so callers can distinguish "did not build" from "built
//! but behaves incorrectly".

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use alembic_schema::TestProcedure;
use serde::Serialize;
use wait_timeout::ChildExt;

/// What exists at the control socket path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    /// Nothing exists at the path yet.
    Missing,
    /// Something exists but it is not a socket object.
    NotSocket,
    /// A filesystem socket object exists.
    Socket,
}

/// Combined result of a finished child process.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// Combined stdout and stderr, trimmed.
    pub output: String,
}

/// Seam over process spawning and socket inspection, so assertions are
/// testable without a real binary.
pub trait TestHost {
    /// Run a program to completion and capture its combined output.
    fn run(&mut self, program: &Path, args: &[String]) -> io::Result<RunOutput>;

    /// Spawn a long-running server process without waiting for it.
    fn spawn_server(&mut self, program: &Path, args: &[String]) -> io::Result<()>;

    /// Inspect the control socket path.
    fn socket_state(&mut self, path: &Path) -> SocketState;
}

/// Why a verification assertion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestFailureKind {
    /// The binary could not report its version with exit code zero.
    VersionCheck,
    /// A process could not be spawned at all.
    Spawn,
    /// The control socket never appeared within the bounded timeout.
    SocketTimeout,
    /// A path appeared at the socket location but is not a socket object.
    NotASocket,
    /// The client did not produce the expected diagnostic.
    Diagnostic,
}

/// One failed assertion: kind plus a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct TestFailure {
    /// Failure classification.
    pub kind: TestFailureKind,
    /// What was observed.
    pub message: String,
}

/// Outcome of a smoke-test run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestReport {
    /// Every assertion that failed, in the order checked.
    pub failures: Vec<TestFailure>,
}

impl TestReport {
    /// Whether every assertion passed.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, kind: TestFailureKind, message: impl Into<String>) {
        self.failures.push(TestFailure {
            kind,
            message: message.into(),
        });
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the smoke test against `binary`, using `socket` as the control
/// socket path.
///
/// The socket wait is the only blocking step and is bounded by the
/// procedure's timeout. Exceeding it is terminal for this run, not
/// retryable.
pub fn run_smoke_test(
    host: &mut impl TestHost,
    binary: &Path,
    test: &TestProcedure,
    socket: &Path,
) -> TestReport {
    let mut report = TestReport::default();
    let socket_str = socket.display().to_string();
    let substitute = |args: &[String]| -> Vec<String> {
        args.iter().map(|a| a.replace("{socket}", &socket_str)).collect()
    };

    // 1. The binary reports its version successfully.
    match host.run(binary, &test.version_args) {
        Ok(out) if out.code == Some(0) => {}
        Ok(out) => report.fail(
            TestFailureKind::VersionCheck,
            format!("version check exited {:?}: {}", out.code, out.output),
        ),
        Err(e) => {
            report.fail(TestFailureKind::Spawn, format!("version check: {e}"));
            return report;
        }
    }

    // 2. Server mode against a fresh control socket.
    if let Err(e) = host.spawn_server(binary, &substitute(&test.server_args)) {
        report.fail(TestFailureKind::Spawn, format!("server spawn: {e}"));
        return report;
    }

    // 3. The socket materializes as a socket object within the timeout.
    let deadline = Instant::now() + Duration::from_secs(test.socket_timeout_secs);
    loop {
        match host.socket_state(socket) {
            SocketState::Socket => break,
            SocketState::NotSocket => {
                report.fail(
                    TestFailureKind::NotASocket,
                    format!("{socket_str} exists but is not a socket"),
                );
                return report;
            }
            SocketState::Missing => {
                if Instant::now() >= deadline {
                    report.fail(
                        TestFailureKind::SocketTimeout,
                        format!(
                            "{socket_str} did not appear within {}s",
                            test.socket_timeout_secs
                        ),
                    );
                    return report;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }

    // 4. A client query reports the expected diagnostic once the server
    //    side is not serving this session.
    let expected = test.expected_diagnostic.replace("{socket}", &socket_str);
    match host.run(binary, &substitute(&test.client_args)) {
        Ok(out) if out.output == expected && out.code != Some(0) => {}
        Ok(out) => report.fail(
            TestFailureKind::Diagnostic,
            format!(
                "client exited {:?} with output '{}', expected '{expected}'",
                out.code, out.output
            ),
        ),
        Err(e) => report.fail(TestFailureKind::Spawn, format!("client: {e}")),
    }

    report
}

/// [`TestHost`] backed by `std::process`.
///
/// Spawned servers are killed when the host drops, so a failed test never
/// leaks a process.
#[derive(Debug)]
pub struct SystemHost {
    servers: Vec<Child>,
    run_timeout: Duration,
}

impl SystemHost {
    /// Host with the given bound on client/version invocations.
    pub fn new(run_timeout: Duration) -> Self {
        Self {
            servers: Vec::new(),
            run_timeout,
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl TestHost for SystemHost {
    fn run(&mut self, program: &Path, args: &[String]) -> io::Result<RunOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let Some(status) = child.wait_timeout(self.run_timeout)? else {
            child.kill().ok();
            child.wait().ok();
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{} did not finish in {:?}", program.display(), self.run_timeout),
            ));
        };

        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            io::Read::read_to_string(&mut stdout, &mut output)?;
        }
        if let Some(mut stderr) = child.stderr.take() {
            io::Read::read_to_string(&mut stderr, &mut output)?;
        }

        Ok(RunOutput {
            code: status.code(),
            output: output.trim().to_string(),
        })
    }

    fn spawn_server(&mut self, program: &Path, args: &[String]) -> io::Result<()> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.servers.push(child);
        Ok(())
    }

    fn socket_state(&mut self, path: &Path) -> SocketState {
        let Ok(metadata) = std::fs::symlink_metadata(path) else {
            return SocketState::Missing;
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if metadata.file_type().is_socket() {
                return SocketState::Socket;
            }
        }
        let _ = metadata;
        SocketState::NotSocket
    }
}

impl Drop for SystemHost {
    fn drop(&mut self) {
        for child in &mut self.servers {
            child.kill().ok();
            child.wait().ok();
        }
    }
}
