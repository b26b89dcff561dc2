//! `adb`-backed [`DeviceShell`].

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use super::DeviceShell;
use crate::error::ShellError;

/// Environment variable that overrides bridge discovery.
pub const BRIDGE_ENV: &str = "DROIDPERF_ADB";

/// Poll period while waiting on a bounded command.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[cfg(windows)]
const BRIDGE_FILE: &str = "adb.exe";
#[cfg(not(windows))]
const BRIDGE_FILE: &str = "adb";

/// Resolve the bridge executable.
///
/// Order: `$DROIDPERF_ADB`, then a bundled copy at `adb/adb[.exe]` beside the
/// running executable, then plain `adb` resolved through `PATH`.
pub fn locate_bridge() -> PathBuf {
    if let Some(path) = std::env::var_os(BRIDGE_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(bundled) = bundled_bridge() {
        return bundled;
    }
    PathBuf::from(BRIDGE_FILE)
}

fn bundled_bridge() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join("adb").join(BRIDGE_FILE);
    candidate.is_file().then_some(candidate)
}

/// Runs commands through the `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbShell {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl AdbShell {
    /// Bridge located with [`locate_bridge`], no command timeout.
    pub fn new() -> Self {
        Self::with_program(locate_bridge())
    }

    /// Use an explicit bridge executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill commands that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn_error(&self, err: std::io::Error) -> ShellError {
        ShellError::Spawn {
            program: self.program.display().to_string(),
            reason: err.to_string(),
        }
    }

    fn output(&self, args: &[&str]) -> Result<Output, ShellError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match self.timeout {
            None => command.output().map_err(|e| self.spawn_error(e)),
            Some(limit) => self.output_bounded(command, limit),
        }
    }

    /// Spawn, drain both pipes on helper threads, and poll for exit.
    ///
    /// A dumpsys dump can be larger than the pipe buffer; the child blocks
    /// until its pipes are read.
    fn output_bounded(&self, mut command: Command, limit: Duration) -> Result<Output, ShellError> {
        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= limit {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ShellError::Timeout(limit));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(self.spawn_error(e)),
            }
        };

        Ok(Output {
            status,
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

impl Default for AdbShell {
    fn default() -> Self {
        Self::new()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl DeviceShell for AdbShell {
    fn run(&self, args: &[&str]) -> Result<String, ShellError> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(ShellError::Failed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
