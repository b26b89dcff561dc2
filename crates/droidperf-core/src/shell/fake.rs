//! Scripted [`DeviceShell`] that replays canned bridge output.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::DeviceShell;
use crate::error::ShellError;

/// Replays scripted responses keyed by the space-joined argument line.
///
/// Each key holds a queue; responses are consumed front to back and the last
/// one stays sticky, so a single scripted response answers every call.
/// Unscripted commands fail with exit code 1. Every call is recorded.
#[derive(Default)]
pub struct ScriptedShell {
    script: Mutex<HashMap<String, VecDeque<Result<String, ShellError>>>>,
    calls: Mutex<Vec<String>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push) for a successful response.
    pub fn with_output(self, command: &str, stdout: impl Into<String>) -> Self {
        self.push(command, Ok(stdout.into()));
        self
    }

    /// Builder form of [`push`](Self::push) for a failed command.
    pub fn with_failure(self, command: &str, err: ShellError) -> Self {
        self.push(command, Err(err));
        self
    }

    /// Append a response to the queue for `command`.
    pub fn push(&self, command: &str, response: Result<String, ShellError>) {
        guard(&self.script)
            .entry(command.to_string())
            .or_default()
            .push_back(response);
    }

    /// Replace every queued response for `command`.
    pub fn set(&self, command: &str, response: Result<String, ShellError>) {
        guard(&self.script).insert(command.to_string(), VecDeque::from([response]));
    }

    /// Every command issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        guard(&self.calls).clone()
    }

    /// How many times `command` was issued.
    pub fn call_count(&self, command: &str) -> usize {
        guard(&self.calls).iter().filter(|c| *c == command).count()
    }

    /// Shorthand for a permission failure as a modern `adb shell` reports it.
    pub fn permission_denied(path: &str) -> ShellError {
        ShellError::Failed {
            exit_code: Some(1),
            stderr: format!("cat: {path}: Permission denied"),
        }
    }
}

impl DeviceShell for ScriptedShell {
    fn run(&self, args: &[&str]) -> Result<String, ShellError> {
        let key = args.join(" ");
        guard(&self.calls).push(key.clone());

        let mut script = guard(&self.script);
        match script.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(unscripted(&key))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(unscripted(&key))),
            None => Err(unscripted(&key)),
        }
    }
}

fn unscripted(key: &str) -> ShellError {
    ShellError::Failed {
        exit_code: Some(1),
        stderr: format!("unscripted command: {key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_response_is_sticky() {
        let fake = ScriptedShell::new()
            .with_output("devices", "first")
            .with_output("devices", "second");
        assert_eq!(fake.run(&["devices"]).unwrap(), "first");
        assert_eq!(fake.run(&["devices"]).unwrap(), "second");
        assert_eq!(fake.run(&["devices"]).unwrap(), "second");
        assert_eq!(fake.call_count("devices"), 3);
    }

    #[test]
    fn unscripted_command_fails() {
        let fake = ScriptedShell::new();
        let err = fake.run(&["shell", "ls"]).unwrap_err();
        assert!(err.stderr().contains("unscripted command: shell ls"));
        assert_eq!(fake.calls(), vec!["shell ls".to_string()]);
    }

    #[test]
    fn set_replaces_queue() {
        let fake = ScriptedShell::new()
            .with_output("version", "a")
            .with_output("version", "b");
        fake.set("version", Err(ScriptedShell::permission_denied("/x")));
        assert!(fake.run(&["version"]).is_err());
    }
}
