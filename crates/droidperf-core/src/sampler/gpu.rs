//! GPU frequency and load.
//!
//! GPU counters live under vendor-specific sysfs nodes, most of them root
//! gated on production builds. When none is readable the graphics statistics
//! dump is used only to decide whether a GPU pipeline is active, which yields
//! an estimate rather than a measurement.

use super::MetricSampler;
use crate::metric::{
    MetricValue, StrategyChain, StrategyFailure, StrategyResult, reject_permission_denied,
};
use crate::shell::ShellTarget;

/// Load nodes, Adreno first.
pub const GPU_LOAD_PATHS: &[&str] = &[
    "/sys/class/kgsl/kgsl-3d0/gpu_busy_percentage",
    "/sys/class/kgsl/kgsl-3d0/devfreq/gpu_load",
];

/// Frequency nodes across Adreno, Mali and vendor kernels.
pub const GPU_FREQ_PATHS: &[&str] = &[
    "/sys/class/kgsl/kgsl-3d0/gpuclk",
    "/sys/class/kgsl/kgsl-3d0/devfreq/cur_freq",
    "/sys/class/kgsl/kgsl-3d0/freq",
    "/sys/kernel/gpu/gpu_clock",
    "/sys/class/devfreq/gpufreq/cur_freq",
    "/sys/class/kgsl/kgsl-3d0/clock",
    "/sys/kernel/debug/gpu/clock",
    "/sys/devices/platform/kgsl-3d0/kgsl/kgsl-3d0/gpuclk",
    "/sys/devices/soc/1c00000.qcom,kgsl-3d0/kgsl/kgsl-3d0/gpuclk",
    "/sys/devices/platform/gpusysfs/gpu_clock",
];

/// Estimate used when the graphics dump shows GPU activity.
pub const GPU_FREQ_ESTIMATE_MHZ: u32 = 500;
pub const GPU_LOAD_ESTIMATE: u8 = 30;

pub const DEFAULT_GPU_FREQ_MHZ: u32 = 400;
pub const DEFAULT_GPU_LOAD: u8 = 0;

const GPU_MARKER: &str = "GPU";

/// Leading integer of a sysfs read, tolerating a trailing `%` or unit column.
pub fn parse_sysfs_number(output: &str) -> StrategyResult<u64> {
    let output = reject_permission_denied(output)?;
    let token = output
        .split_whitespace()
        .next()
        .ok_or_else(|| StrategyFailure::Parse(String::new()))?;
    let token = token.trim_end_matches('%');
    token
        .parse()
        .map_err(|_| StrategyFailure::Parse(token.to_string()))
}

/// Bring a raw frequency to MHz by magnitude.
///
/// Above one million is Hz, above one thousand is kHz, anything else is
/// already MHz.
pub fn normalize_gpu_freq(raw: u64) -> u32 {
    let mhz = if raw > 1_000_000 {
        raw / 1_000_000
    } else if raw > 1_000 {
        raw / 1_000
    } else {
        raw
    };
    u32::try_from(mhz).unwrap_or(u32::MAX)
}

/// A load percentage; values above 100 mean the node is not a percentage.
pub fn parse_gpu_load(output: &str) -> StrategyResult<u8> {
    let raw = parse_sysfs_number(output)?;
    u8::try_from(raw)
        .ok()
        .filter(|pct| *pct <= 100)
        .ok_or(StrategyFailure::OutOfRange(raw as i64))
}

pub fn parse_gpu_freq(output: &str) -> StrategyResult<u32> {
    match parse_sysfs_number(output)? {
        0 => Err(StrategyFailure::OutOfRange(0)),
        raw => Ok(normalize_gpu_freq(raw)),
    }
}

/// Return `estimate` when the graphics dump mentions the GPU.
fn gfxinfo_estimate<T>(target: &ShellTarget<'_>, estimate: T) -> StrategyResult<T> {
    let dump = target.shell(&["dumpsys", "gfxinfo"])?;
    if dump.contains(GPU_MARKER) {
        Ok(estimate)
    } else {
        Err(StrategyFailure::NotFound(GPU_MARKER.to_string()))
    }
}

impl MetricSampler {
    pub fn gpu_freq(&self) -> MetricValue<u32> {
        let target = self.target();
        let mut chain = StrategyChain::new("gpu_freq");
        for &path in GPU_FREQ_PATHS {
            chain = chain.then(path, move || parse_gpu_freq(&target.cat(path)?));
        }
        chain
            .estimate("gfxinfo", move || {
                gfxinfo_estimate(&target, GPU_FREQ_ESTIMATE_MHZ)
            })
            .or_default(DEFAULT_GPU_FREQ_MHZ)
    }

    pub fn gpu_load(&self) -> MetricValue<u8> {
        let target = self.target();
        let mut chain = StrategyChain::new("gpu_load");
        for &path in GPU_LOAD_PATHS {
            chain = chain.then(path, move || parse_gpu_load(&target.cat(path)?));
        }
        chain
            .estimate("gfxinfo", move || gfxinfo_estimate(&target, GPU_LOAD_ESTIMATE))
            .or_default(DEFAULT_GPU_LOAD)
    }
}
