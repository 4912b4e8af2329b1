//! Installed-compiler queries
//!
//! The resolver asks a [`CompilerProbe`] which version of a compiler is
//! actually installed. [`CommandProbe`] runs the compiler; [`PinnedProbe`]
//! answers from a fixed table.

use super::error::ProbeError;
use super::version::Version;
use crossbeam_channel::RecvTimeoutError;
use std::collections::HashMap;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cap for timeouts too large to add to the clock
const LONGEST_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Reports the installed version of a compiler
pub trait CompilerProbe: Send + Sync {
    /// Query `compiler`, giving up after `timeout`
    fn installed_version(&self, compiler: &str, timeout: Duration) -> Result<Version, ProbeError>;
}

/// Answers from a fixed compiler -> version table
#[derive(Debug, Clone, Default)]
pub struct PinnedProbe {
    versions: HashMap<String, Version>,
    fallback: Option<Version>,
}

impl PinnedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `version` for every compiler not listed explicitly
    pub fn any(version: Version) -> Self {
        Self {
            versions: HashMap::new(),
            fallback: Some(version),
        }
    }

    pub fn with(mut self, compiler: impl Into<String>, version: Version) -> Self {
        self.versions.insert(compiler.into(), version);
        self
    }
}

impl CompilerProbe for PinnedProbe {
    fn installed_version(&self, compiler: &str, _timeout: Duration) -> Result<Version, ProbeError> {
        self.versions
            .get(compiler)
            .copied()
            .or(self.fallback)
            .ok_or_else(|| ProbeError::Unavailable {
                compiler: compiler.to_string(),
                reason: "not installed".to_string(),
            })
    }
}

/// Runs `<compiler> --version` (or a configured command) and parses its output
#[derive(Debug, Clone, Default)]
pub struct CommandProbe {
    commands: HashMap<String, Vec<String>>,
}

impl CommandProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `argv` instead of `<compiler> --version` for this compiler
    pub fn with_command(mut self, compiler: impl Into<String>, argv: Vec<String>) -> Self {
        self.commands.insert(compiler.into(), argv);
        self
    }

    pub fn with_commands(mut self, commands: HashMap<String, Vec<String>>) -> Self {
        self.commands.extend(commands);
        self
    }

    fn argv_for(&self, compiler: &str) -> Vec<String> {
        self.commands
            .get(compiler)
            .cloned()
            .unwrap_or_else(|| vec![compiler.to_string(), "--version".to_string()])
    }
}

impl CompilerProbe for CommandProbe {
    fn installed_version(&self, compiler: &str, timeout: Duration) -> Result<Version, ProbeError> {
        let unavailable = |reason: String| ProbeError::Unavailable {
            compiler: compiler.to_string(),
            reason,
        };

        let argv = self.argv_for(compiler);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| unavailable("empty version command".to_string()))?;

        debug!(
            compiler,
            command = ?argv,
            timeout_ms = timeout.as_millis() as u64,
            "querying installed compiler"
        );

        // One bound covers spawning, reading output and waiting for exit.
        let started = Instant::now();
        let deadline = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + LONGEST_WAIT);
        let timed_out = || ProbeError::TimedOut {
            compiler: compiler.to_string(),
            after: timeout,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(format!("failed to run '{program}': {e}")))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| unavailable("stdout was not captured".to_string()))?;

        // The reader finishes when the child closes stdout; the channel lets
        // this thread stop waiting without joining it.
        let (tx, rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            let mut output = String::new();
            let result = stdout.read_to_string(&mut output).map(|_| output);
            let _ = tx.send(result);
        });

        let output = match rx.recv_deadline(deadline) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                reap(&mut child);
                return Err(unavailable(format!("failed to read output: {e}")));
            }
            Err(RecvTimeoutError::Timeout) => {
                reap(&mut child);
                return Err(timed_out());
            }
            Err(RecvTimeoutError::Disconnected) => {
                reap(&mut child);
                return Err(unavailable("output reader stopped unexpectedly".to_string()));
            }
        };

        // The child may keep running after closing stdout.
        let status = match wait_until(&mut child, deadline)
            .map_err(|e| unavailable(format!("failed to wait for '{program}': {e}")))?
        {
            Some(status) => status,
            None => {
                reap(&mut child);
                return Err(timed_out());
            }
        };

        if !status.success() {
            return Err(unavailable(format!("'{program}' exited with {status}")));
        }
        let version = Version::extract(&output)
            .ok_or_else(|| unavailable("no version found in output".to_string()))?;
        debug!(compiler, %version, "installed compiler reported version");
        Ok(version)
    }
}

/// Poll for exit until `deadline`; `None` if the child is still running
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        std::thread::sleep(EXIT_POLL_INTERVAL.min(deadline - now));
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
