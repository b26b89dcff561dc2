//! Per-core CPU load from successive `/proc/stat` snapshots.
//!
//! `/proc/stat` exposes cumulative tick counters, so a load percentage needs
//! two readings. [`LoadDeltaTracker`] keeps exactly one previous generation and
//! replaces it wholesale on every [`compute`](LoadDeltaTracker::compute).

use std::collections::BTreeMap;

/// Core index as it appears in `cpuN` rows.
pub type CoreId = u32;

/// Cumulative counters for one core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCoreSnapshot {
    /// Sum of user, nice, system, idle, iowait, irq, softirq and steal.
    pub total_ticks: u64,
    /// idle + iowait.
    pub idle_ticks: u64,
}

/// Parse per-core rows out of `/proc/stat` text.
///
/// The aggregate `cpu` row and rows with fewer than seven counters are
/// skipped. `steal` is optional (older kernels omit it).
pub fn parse_proc_stat(text: &str) -> BTreeMap<CoreId, CpuCoreSnapshot> {
    let mut cores = BTreeMap::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(core) = label
            .strip_prefix("cpu")
            .and_then(|n| n.parse::<CoreId>().ok())
        else {
            continue;
        };
        let counters: Vec<u64> = fields
            .take(8)
            .map_while(|f| f.parse::<u64>().ok())
            .collect();
        if counters.len() < 7 {
            continue;
        }
        let total_ticks = counters.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
        let idle_ticks = counters[3].saturating_add(counters[4]);
        cores.insert(
            core,
            CpuCoreSnapshot {
                total_ticks,
                idle_ticks,
            },
        );
    }
    cores
}

/// Load percentage between two snapshots of the same core.
///
/// A counter that did not advance (or went backwards after a reboot) yields 0.
pub fn core_load(prev: CpuCoreSnapshot, curr: CpuCoreSnapshot) -> u8 {
    let total_delta = i128::from(curr.total_ticks) - i128::from(prev.total_ticks);
    if total_delta <= 0 {
        return 0;
    }
    let idle_delta = i128::from(curr.idle_ticks) - i128::from(prev.idle_ticks);
    let busy = (total_delta - idle_delta) as f64;
    let pct = (100.0 * busy / total_delta as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Converts consecutive snapshots into per-core load.
///
/// Not synchronized: one monitoring loop owns one tracker.
#[derive(Debug, Default, Clone)]
pub struct LoadDeltaTracker {
    previous: BTreeMap<CoreId, CpuCoreSnapshot>,
}

impl LoadDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute load for every core in `current`, then make `current` the
    /// stored generation.
    ///
    /// Cores without a previous reading report 0 for this tick.
    pub fn compute(&mut self, current: BTreeMap<CoreId, CpuCoreSnapshot>) -> BTreeMap<CoreId, u8> {
        let loads = current
            .iter()
            .map(|(core, snap)| {
                let load = self
                    .previous
                    .get(core)
                    .map_or(0, |prev| core_load(*prev, *snap));
                (*core, load)
            })
            .collect();
        self.previous = current;
        loads
    }

    /// True once at least one generation has been stored.
    pub fn is_primed(&self) -> bool {
        !self.previous.is_empty()
    }
}
