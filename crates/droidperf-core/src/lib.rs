//! # droidperf-core
//!
//! Live performance telemetry for Android devices reached over `adb`.
//!
//! Once per tick the sampling loop scrapes frame rate, per-core CPU frequency
//! and load, GPU frequency and load, and battery current/power out of the
//! device's diagnostic commands, and publishes one [`TelemetryFrame`] to every
//! subscribed observer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use droidperf_core::{AdbShell, BroadcastPublisher, DeviceSession};
//!
//! let publisher = Arc::new(BroadcastPublisher::new());
//! let frames = publisher.subscribe();
//! let session = DeviceSession::new(Arc::new(AdbShell::new()), publisher.clone());
//!
//! session.connect_wired()?;
//! session.start_monitoring(Duration::from_secs(1))?;
//! let frame = frames.recv().unwrap();
//! println!("{} fps, {:.0} mW", frame.fps, frame.power);
//! session.disconnect()?;
//! # Ok::<(), droidperf_core::SessionError>(())
//! ```
//!
//! ## Architecture
//!
//! DeviceShell → MetricSampler (strategy chains) → TelemetryFrame → TelemetryPublisher
//!
//! Every device read goes through the [`DeviceShell`] seam, so all parsing is
//! testable against captured output with [`ScriptedShell`]. A metric that
//! cannot be read degrades to a default flagged `acquired: false`; it never
//! aborts the tick.

pub mod config;
pub mod control;
pub mod cpu_load;
pub mod device;
pub mod error;
pub mod frame;
pub mod metric;
pub mod publisher;
pub mod sampler;
pub mod session;
pub mod shell;

pub use config::{DEFAULT_INTERVAL, SessionConfig, interval_from_secs};
pub use control::{
    BridgeStatus, ConnectRequest, ControlResponse, ControlSurface, DeviceList, StartRequest,
};
pub use cpu_load::{CoreId, CpuCoreSnapshot, LoadDeltaTracker};
pub use device::{DeviceHandle, DeviceInfo};
pub use error::{SessionError, ShellError};
pub use frame::{AcquiredFlags, BatteryReading, MetricsSample, TelemetryFrame};
pub use metric::{MetricValue, StrategyChain, StrategyFailure};
pub use publisher::{BroadcastPublisher, TelemetryPublisher};
pub use sampler::MetricSampler;
pub use session::{CancelToken, DeviceSession, SessionState};
pub use shell::{AdbShell, DeviceShell, ScriptedShell};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
