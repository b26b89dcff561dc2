//! Device bridge command execution.
//!
//! Everything this crate learns about a device comes from plain-text output of
//! bridge commands. The [`DeviceShell`] trait is the single seam for that: the
//! real implementation ([`AdbShell`]) spawns the `adb` executable, while
//! [`ScriptedShell`] replays canned output for tests and offline parsing work.

pub mod adb;
pub mod fake;

use std::sync::Arc;

use crate::error::ShellError;

pub use adb::{AdbShell, BRIDGE_ENV, locate_bridge};
pub use fake::ScriptedShell;

/// Executes one bridge command line and returns its captured stdout.
pub trait DeviceShell: Send + Sync {
    /// Run the bridge with `args` (the executable itself is implied).
    fn run(&self, args: &[&str]) -> Result<String, ShellError>;
}

impl<T: DeviceShell + ?Sized> DeviceShell for Arc<T> {
    fn run(&self, args: &[&str]) -> Result<String, ShellError> {
        (**self).run(args)
    }
}

/// A bridge bound to one device serial.
///
/// Device-scoped commands go out as `-s <serial> shell ...` so a second
/// attached device never makes the bridge ambiguous.
#[derive(Clone, Copy)]
pub struct ShellTarget<'a> {
    shell: &'a dyn DeviceShell,
    serial: &'a str,
}

impl<'a> ShellTarget<'a> {
    pub fn new(shell: &'a dyn DeviceShell, serial: &'a str) -> Self {
        Self { shell, serial }
    }

    /// Run a shell command on the device.
    pub fn shell(&self, command: &[&str]) -> Result<String, ShellError> {
        let mut args = Vec::with_capacity(command.len() + 3);
        args.extend_from_slice(&["-s", self.serial, "shell"]);
        args.extend_from_slice(command);
        self.shell.run(&args)
    }

    /// Read a file on the device with `cat`.
    pub fn cat(&self, path: &str) -> Result<String, ShellError> {
        self.shell(&["cat", path])
    }

    /// Read a system property; empty values are reported as `None`.
    pub fn getprop(&self, key: &str) -> Option<String> {
        let value = self.shell(&["getprop", key]).ok()?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}
