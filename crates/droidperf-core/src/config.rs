//! Session timing configuration.

use std::time::Duration;

/// Default tick interval for monitoring.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Port adb listens on for wireless debugging.
pub const DEFAULT_WIRELESS_PORT: u16 = 5555;

/// Timings used by a [`DeviceSession`](crate::session::DeviceSession) and
/// its sampling loop.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wait after clearing compositor latency / resetting gfx stats before
    /// reading them back.
    pub settle_delay: Duration,
    /// Loop back-off while the bridge is unreachable.
    pub bridge_retry_delay: Duration,
    /// Loop pause after a tick failed unexpectedly.
    pub error_pause: Duration,
    /// How long `disconnect` waits for the loop to exit.
    pub disconnect_grace: Duration,
    /// Port appended to wireless connect targets.
    pub wireless_port: u16,
    /// Tick interval used when a start request does not name one.
    pub default_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            bridge_retry_delay: Duration::from_secs(2),
            error_pause: Duration::from_secs(1),
            disconnect_grace: Duration::from_secs(1),
            wireless_port: DEFAULT_WIRELESS_PORT,
            default_interval: DEFAULT_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Zero delays everywhere; for tests and scripted shells.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            bridge_retry_delay: Duration::from_millis(10),
            error_pause: Duration::from_millis(10),
            disconnect_grace: Duration::from_secs(1),
            wireless_port: DEFAULT_WIRELESS_PORT,
            default_interval: DEFAULT_INTERVAL,
        }
    }
}

/// Parse a tick interval given in (fractional) seconds.
///
/// Rejects non-finite, zero and negative values.
pub fn interval_from_secs(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
