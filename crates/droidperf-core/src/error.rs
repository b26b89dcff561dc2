//! Error types for bridge commands and session control.
//!
//! Two layers of failure exist in this crate:
//! - [`ShellError`]: a single bridge command could not be run or exited non-zero.
//! - [`SessionError`]: a control operation was rejected (precondition violated,
//!   bridge unreachable, device refused a connection).
//!
//! Per-metric acquisition failures never reach either type; they are modelled
//! as [`StrategyFailure`](crate::metric::StrategyFailure) and absorbed by the
//! metric's fallback chain.

use std::time::Duration;

use thiserror::Error;

/// Failure executing one command through the device bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// The bridge executable could not be launched at all.
    #[error("failed to launch {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The bridge ran but reported failure.
    #[error("bridge command failed (exit code {exit_code:?}): {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The command did not finish within the configured bound and was killed.
    #[error("bridge command timed out after {0:?}")]
    Timeout(Duration),
}

impl ShellError {
    /// Captured stderr, if the command got far enough to produce any.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Failed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

/// Rejection of a session control operation.
///
/// These are precondition violations or connectivity problems; they are
/// returned synchronously to the caller and never terminate the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The bridge tool is missing or not answering.
    #[error("device bridge is unavailable")]
    BridgeUnavailable,

    /// No attached device reported the `device` status.
    #[error("no connected device found")]
    NoDeviceFound,

    /// The operation needs a connected device.
    #[error("no device connected")]
    NotConnected,

    /// Monitoring is already running for this session.
    #[error("monitoring is already running")]
    AlreadyMonitoring,

    /// Monitoring is not running for this session.
    #[error("monitoring is not running")]
    NotMonitoring,

    /// A caller-supplied argument was rejected before any bridge command ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The bridge answered a wireless connect without confirming the connection.
    #[error("connection refused: {0}")]
    ConnectFailed(String),

    /// The sampling thread could not be started.
    #[error("failed to start sampling loop: {0}")]
    LoopSpawn(String),

    /// A bridge command failed during a control operation.
    #[error(transparent)]
    Bridge(#[from] ShellError),
}

/// Convenience alias for session control results.
pub type Result<T> = std::result::Result<T, SessionError>;
