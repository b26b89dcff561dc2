//! Per-metric acquisition with device-specific fallbacks.
//!
//! Each submodule owns one metric family: the text parsers for the diagnostic
//! output it scrapes (pure functions, testable against captured output) and
//! the [`StrategyChain`](crate::metric::StrategyChain) wiring that decides
//! which commands to try and in what order.
//!
//! | metric        | strategies                                         | default  |
//! |---------------|----------------------------------------------------|----------|
//! | frame rate    | SurfaceFlinger latency, gfxinfo frame stats        | 60       |
//! | CPU frequency | `scaling_cur_freq`, `cpuinfo_cur_freq` per core    | 1500 MHz |
//! | CPU load      | `/proc/stat` through [`LoadDeltaTracker`]          | `{0: 0}` |
//! | GPU frequency | vendor sysfs paths, gfxinfo estimate (500 MHz)     | 400 MHz  |
//! | GPU load      | kgsl sysfs paths, gfxinfo estimate (30 %)          | 0 %      |
//! | battery       | `dumpsys battery`                                  | 0 / 0    |

pub mod battery;
pub mod cpu;
pub mod fps;
pub mod gpu;

use std::sync::Arc;
use std::time::Duration;

use crate::cpu_load::LoadDeltaTracker;
use crate::device::DeviceHandle;
use crate::frame::MetricsSample;
use crate::shell::{DeviceShell, ShellTarget};

/// Samples every metric for one device.
///
/// Holds the CPU-load snapshot history, so one sampler belongs to one
/// monitoring loop.
pub struct MetricSampler {
    shell: Arc<dyn DeviceShell>,
    handle: DeviceHandle,
    settle_delay: Duration,
    tracker: LoadDeltaTracker,
}

impl MetricSampler {
    pub fn new(shell: Arc<dyn DeviceShell>, handle: DeviceHandle, settle_delay: Duration) -> Self {
        Self {
            shell,
            handle,
            settle_delay,
            tracker: LoadDeltaTracker::new(),
        }
    }

    pub fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    fn target(&self) -> ShellTarget<'_> {
        ShellTarget::new(self.shell.as_ref(), self.handle.as_str())
    }

    fn settle(&self) {
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
    }

    /// Gather every metric once. Each metric degrades independently.
    pub fn sample(&mut self) -> MetricsSample {
        let fps = self.fps();
        let cpu_freq = self.cpu_freq();
        let gpu_freq = self.gpu_freq();
        let cpu_load = self.cpu_load();
        let gpu_load = self.gpu_load();
        let battery = self.battery();
        MetricsSample {
            fps,
            cpu_freq,
            cpu_load,
            gpu_freq,
            gpu_load,
            battery,
        }
    }
}
