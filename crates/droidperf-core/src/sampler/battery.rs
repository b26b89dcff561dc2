//! Battery current and power draw.

use super::MetricSampler;
use crate::frame::BatteryReading;
use crate::metric::{MetricValue, StrategyChain, StrategyFailure, StrategyResult};

const CURRENT_KEY: &str = "current now";
const VOLTAGE_KEY: &str = "voltage";

fn parse_field(key: &str, value: &str) -> StrategyResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| StrategyFailure::Parse(format!("{key}: {}", value.trim())))
}

/// Derive current and power from a battery-status dump.
///
/// `current now` is in µA (signed by charge direction) and `voltage` in mV.
/// Current is reported as an absolute mA value and power as mA × V, in mW.
pub fn parse_battery(dump: &str) -> StrategyResult<BatteryReading> {
    let mut current_ua = None;
    let mut voltage_mv = None;
    for line in dump.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            CURRENT_KEY => current_ua = Some(parse_field(CURRENT_KEY, value)?),
            VOLTAGE_KEY => voltage_mv = Some(parse_field(VOLTAGE_KEY, value)?),
            _ => {}
        }
    }
    let current_ua =
        current_ua.ok_or_else(|| StrategyFailure::NotFound(CURRENT_KEY.to_string()))?;
    let voltage_mv =
        voltage_mv.ok_or_else(|| StrategyFailure::NotFound(VOLTAGE_KEY.to_string()))?;

    let current_ma = (current_ua as f64 / 1000.0).abs();
    let voltage_v = voltage_mv as f64 / 1000.0;
    Ok(BatteryReading {
        current_ma,
        power_mw: current_ma * voltage_v,
    })
}

impl MetricSampler {
    pub fn battery(&self) -> MetricValue<BatteryReading> {
        let target = self.target();
        StrategyChain::new("battery")
            .then("dumpsys battery", || {
                parse_battery(&target.shell(&["dumpsys", "battery"])?)
            })
            .or_default(BatteryReading::default())
    }
}
