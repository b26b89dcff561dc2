//! Per-core CPU frequency and load.

use std::collections::BTreeMap;

use super::MetricSampler;
use crate::cpu_load::{CoreId, CpuCoreSnapshot, parse_proc_stat};
use crate::metric::{
    MetricValue, StrategyChain, StrategyFailure, StrategyResult, reject_permission_denied,
};
use crate::shell::ShellTarget;

/// Assumed when the possible-CPU range cannot be read.
pub const DEFAULT_CORE_COUNT: u32 = 8;

/// Reported for a core whose frequency cannot be read.
pub const DEFAULT_CORE_FREQ_MHZ: u32 = 1500;

/// Ranges claiming more cores than this are treated as unreadable.
pub const MAX_CORE_COUNT: u32 = 256;

const POSSIBLE_CPUS: &str = "/sys/devices/system/cpu/possible";
const PROC_STAT: &str = "/proc/stat";

/// Number of cores from a possible-CPU range such as `0-7` or `0-3,6-7`.
///
/// The count is the highest listed index plus one. Counts above
/// [`MAX_CORE_COUNT`] are rejected.
pub fn parse_core_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut highest: Option<u32> = None;
    for part in text.split([',', '-']) {
        let index: u32 = part.trim().parse().ok()?;
        highest = highest.max(Some(index));
    }
    highest
        .and_then(|h| h.checked_add(1))
        .filter(|&count| count <= MAX_CORE_COUNT)
}

/// Frequency files for one core, most specific first.
pub fn freq_paths(core: CoreId) -> [String; 2] {
    [
        format!("/sys/devices/system/cpu/cpu{core}/cpufreq/scaling_cur_freq"),
        format!("/sys/devices/system/cpu/cpu{core}/cpufreq/cpuinfo_cur_freq"),
    ]
}

/// A bare decimal kHz reading converted to MHz.
pub fn parse_khz(text: &str) -> StrategyResult<u32> {
    let text = reject_permission_denied(text)?.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StrategyFailure::Parse(text.to_string()));
    }
    let khz: u64 = text
        .parse()
        .map_err(|_| StrategyFailure::Parse(text.to_string()))?;
    u32::try_from(khz / 1000).map_err(|_| StrategyFailure::OutOfRange(khz as i64))
}

fn read_khz(target: &ShellTarget<'_>, path: &str) -> StrategyResult<u32> {
    parse_khz(&target.cat(path)?)
}

fn read_proc_stat(target: &ShellTarget<'_>) -> StrategyResult<BTreeMap<CoreId, CpuCoreSnapshot>> {
    let text = target.cat(PROC_STAT)?;
    let cores = parse_proc_stat(&text);
    if cores.is_empty() {
        return Err(StrategyFailure::Parse("no per-core rows".to_string()));
    }
    Ok(cores)
}

impl MetricSampler {
    /// Core count reported by the kernel, or [`DEFAULT_CORE_COUNT`].
    pub fn core_count(&self) -> u32 {
        match self.target().cat(POSSIBLE_CPUS) {
            Ok(text) => parse_core_count(&text).unwrap_or(DEFAULT_CORE_COUNT),
            Err(e) => {
                log::debug!("cpu: possible range unreadable: {e}");
                DEFAULT_CORE_COUNT
            }
        }
    }

    /// Current MHz for every core. Acquired only when every core was read.
    pub fn cpu_freq(&self) -> MetricValue<BTreeMap<CoreId, u32>> {
        let target = self.target();
        let mut by_core = BTreeMap::new();
        let mut all_read = true;
        for core in 0..self.core_count() {
            let [scaling, cpuinfo] = freq_paths(core);
            let freq = StrategyChain::new("cpu_freq")
                .then("scaling_cur_freq", || read_khz(&target, &scaling))
                .then("cpuinfo_cur_freq", || read_khz(&target, &cpuinfo))
                .or_default(DEFAULT_CORE_FREQ_MHZ);
            all_read &= freq.acquired;
            by_core.insert(core, freq.value);
        }
        MetricValue {
            acquired: all_read && !by_core.is_empty(),
            value: by_core,
        }
    }

    /// Per-core busy percentage since the previous call.
    ///
    /// The first successful read only primes the tracker and reports zero
    /// for every core. A failed read leaves the tracker untouched.
    pub fn cpu_load(&mut self) -> MetricValue<BTreeMap<CoreId, u8>> {
        let target = self.target();
        let snapshot = StrategyChain::new("cpu_load")
            .then("proc_stat", || read_proc_stat(&target))
            .or_default(BTreeMap::new());
        if !snapshot.acquired {
            return MetricValue::fallback(BTreeMap::from([(0, 0)]));
        }
        let primed = self.tracker.is_primed();
        let loads = self.tracker.compute(snapshot.value);
        MetricValue {
            value: loads,
            acquired: primed,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::{cmd, sampler};
    use super::*;
    use crate::shell::ScriptedShell;

    const STAT_A: &str = "\
cpu  1000 0 500 8000 200 0 0 0 0 0
cpu0 500 0 250 4000 100 0 0 0 0 0
cpu1 500 0 250 4000 100 0 0 0 0 0
intr 123456
ctxt 987654
";

    const STAT_B: &str = "\
cpu  2000 0 900 8600 200 0 0 0 0 0
cpu0 1000 0 450 4300 100 0 0 0 0 0
cpu1 1000 0 450 4300 100 0 0 0 0 0
";

    #[test]
    fn core_count_from_possible_range() {
        assert_eq!(parse_core_count("0-7\n"), Some(8));
        assert_eq!(parse_core_count("0"), Some(1));
        assert_eq!(parse_core_count("0-3,6-7"), Some(8));
        assert_eq!(parse_core_count(""), None);
        assert_eq!(parse_core_count("cat: no such file"), None);
    }

    #[test]
    fn oversized_range_is_rejected() {
        assert_eq!(parse_core_count("0-4294967295"), None);
        assert_eq!(parse_core_count("4294967295"), None);
        assert_eq!(parse_core_count("0-99999"), None);
        assert_eq!(parse_core_count("0-255"), Some(MAX_CORE_COUNT));
        assert_eq!(parse_core_count("0-256"), None);
    }

    #[test]
    fn khz_reading_truncates_to_mhz() {
        assert_eq!(parse_khz("1804800\n"), Ok(1804));
        assert_eq!(parse_khz("999"), Ok(0));
        assert!(parse_khz("").is_err());
        assert!(parse_khz("18048OO").is_err());
        assert!(matches!(
            parse_khz("cat: scaling_cur_freq: Permission denied"),
            Err(StrategyFailure::PermissionDenied(_))
        ));
    }

    #[test]
    fn frequency_falls_back_per_path_then_per_core() {
        let [c0_scaling, _] = freq_paths(0);
        let [c1_scaling, c1_cpuinfo] = freq_paths(1);
        let fake = Arc::new(
            ScriptedShell::new()
                .with_output(&cmd(&format!("cat {POSSIBLE_CPUS}")), "0-2")
                .with_output(&cmd(&format!("cat {c0_scaling}")), "2016000")
                .with_failure(
                    &cmd(&format!("cat {c1_scaling}")),
                    ScriptedShell::permission_denied(&c1_scaling),
                )
                .with_output(&cmd(&format!("cat {c1_cpuinfo}")), "1113600"),
        );
        let freq = sampler(fake).cpu_freq();
        assert_eq!(freq.value, BTreeMap::from([(0, 2016), (1, 1113), (2, 1500)]));
        assert!(!freq.acquired);
    }

    #[test]
    fn unreadable_range_assumes_eight_cores() {
        let fake = Arc::new(ScriptedShell::new());
        let freq = sampler(fake).cpu_freq();
        assert_eq!(freq.value.len(), 8);
        assert_eq!(freq.value.keys().last(), Some(&7));
    }

    #[test]
    fn garbage_range_assumes_eight_cores() {
        let fake = Arc::new(
            ScriptedShell::new()
                .with_output(&cmd(&format!("cat {POSSIBLE_CPUS}")), "0-4294967295\n"),
        );
        let s = sampler(fake.clone());
        assert_eq!(s.core_count(), DEFAULT_CORE_COUNT);
        let freq = s.cpu_freq();
        assert_eq!(freq.value.len(), 8);
        assert!(fake.calls().len() < 32);
    }

    #[test]
    fn load_primes_then_reports_deltas() {
        let stat = cmd("cat /proc/stat");
        let fake = Arc::new(ScriptedShell::new());
        fake.push(&stat, Ok(STAT_A.to_string()));
        fake.push(&stat, Ok(STAT_B.to_string()));
        let mut s = sampler(fake);

        let first = s.cpu_load();
        assert_eq!(first.value, BTreeMap::from([(0, 0), (1, 0)]));
        assert!(!first.acquired);

        let second = s.cpu_load();
        assert_eq!(second.value, BTreeMap::from([(0, 70), (1, 70)]));
        assert!(second.acquired);
    }

    #[test]
    fn failed_read_keeps_history() {
        let stat = cmd("cat /proc/stat");
        let fake = Arc::new(ScriptedShell::new());
        fake.push(&stat, Ok(STAT_A.to_string()));
        fake.push(
            &stat,
            Err(crate::error::ShellError::Timeout(std::time::Duration::from_secs(5))),
        );
        fake.push(&stat, Ok(STAT_B.to_string()));
        let mut s = sampler(fake);

        s.cpu_load();
        let failed = s.cpu_load();
        assert_eq!(failed, MetricValue::fallback(BTreeMap::from([(0, 0)])));
        let recovered = s.cpu_load();
        assert_eq!(recovered.value[&0], 70);
    }
}
