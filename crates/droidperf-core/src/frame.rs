//! One tick's worth of telemetry.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cpu_load::CoreId;
use crate::metric::MetricValue;

/// Battery draw derived from the battery-status dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Absolute current in mA.
    pub current_ma: f64,
    /// Power in mW.
    pub power_mw: f64,
}

/// Every metric gathered in one tick, with acquisition flags.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSample {
    pub fps: MetricValue<u32>,
    pub cpu_freq: MetricValue<BTreeMap<CoreId, u32>>,
    pub cpu_load: MetricValue<BTreeMap<CoreId, u8>>,
    pub gpu_freq: MetricValue<u32>,
    pub gpu_load: MetricValue<u8>,
    pub battery: MetricValue<BatteryReading>,
}

/// Which frame fields were genuinely measured this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquiredFlags {
    pub fps: bool,
    pub cpu_freq: bool,
    pub cpu_load: bool,
    pub gpu_freq: bool,
    pub gpu_load: bool,
    pub battery: bool,
}

/// Immutable telemetry frame published once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryFrame {
    /// Unix time in seconds.
    pub timestamp: f64,
    pub fps: u32,
    /// MHz per core.
    pub cpu_freq_by_core: BTreeMap<CoreId, u32>,
    /// MHz.
    pub gpu_freq: u32,
    /// Percent per core.
    pub cpu_load_by_core: BTreeMap<CoreId, u8>,
    /// Percent.
    pub gpu_load: u8,
    /// mA.
    pub current: f64,
    /// mW.
    pub power: f64,
    pub acquired: AcquiredFlags,
}

impl TelemetryFrame {
    pub fn compose(timestamp: f64, sample: MetricsSample) -> Self {
        let acquired = AcquiredFlags {
            fps: sample.fps.acquired,
            cpu_freq: sample.cpu_freq.acquired,
            cpu_load: sample.cpu_load.acquired,
            gpu_freq: sample.gpu_freq.acquired,
            gpu_load: sample.gpu_load.acquired,
            battery: sample.battery.acquired,
        };
        Self {
            timestamp,
            fps: sample.fps.value,
            cpu_freq_by_core: sample.cpu_freq.value,
            gpu_freq: sample.gpu_freq.value,
            cpu_load_by_core: sample.cpu_load.value,
            gpu_load: sample.gpu_load.value,
            current: round2(sample.battery.value.current_ma),
            power: round2(sample.battery.value.power_mw),
            acquired,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Wall-clock seconds since the Unix epoch.
pub fn unix_secs_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
