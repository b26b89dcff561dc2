pub mod check;
pub mod devices;
pub mod info;
pub mod monitor;
pub mod sample;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use droidperf_core::shell::AdbShell;
use droidperf_core::{
    DeviceInfo, DeviceSession, TelemetryFrame, TelemetryPublisher, interval_from_secs,
};

/// Global flags describing how to reach adb.
pub struct BridgeOptions<'a> {
    pub adb: Option<&'a str>,
    pub command_timeout: Option<f64>,
}

/// Print an error and exit with status 1.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// Seconds from the command line as a tick interval, or exit.
pub fn parse_interval(secs: f64) -> Duration {
    interval_from_secs(secs)
        .unwrap_or_else(|| fail(format!("interval must be a positive number of seconds, got {secs}")))
}

pub fn make_shell(opts: &BridgeOptions<'_>) -> Arc<AdbShell> {
    let shell = match opts.adb {
        Some(path) => AdbShell::with_program(path),
        None => AdbShell::new(),
    };
    let timeout = opts.command_timeout.map(parse_interval);
    Arc::new(shell.with_timeout(timeout))
}

pub fn make_session(
    opts: &BridgeOptions<'_>,
    publisher: Arc<dyn TelemetryPublisher>,
) -> DeviceSession {
    DeviceSession::new(make_shell(opts), publisher)
}

/// Connect wirelessly when `ip` is given, otherwise to the first USB device.
pub fn connect(session: &DeviceSession, ip: Option<&str>) -> DeviceInfo {
    let result = match ip {
        Some(ip) => session.connect_wireless(ip),
        None => session.connect_wired(),
    };
    match result {
        Ok(info) => info,
        Err(e) => fail(e),
    }
}

/// Publisher for commands that never start the loop.
pub fn no_publisher() -> Arc<dyn TelemetryPublisher> {
    Arc::new(|_: &TelemetryFrame| {})
}

fn joined<T: std::fmt::Display>(values: impl Iterator<Item = T>, suffix: &str) -> String {
    values
        .map(|v| format!("{v}{suffix}"))
        .collect::<Vec<_>>()
        .join("/")
}

/// Mark values that are defaults or estimates.
fn flag(acquired: bool) -> &'static str {
    if acquired { "" } else { "~" }
}

/// One human-readable row per frame.
pub fn format_frame_line(frame: &TelemetryFrame) -> String {
    let a = &frame.acquired;
    format!(
        "{:>3}{} fps | cpu {}{} MHz | load {}{} | gpu {}{} MHz {}%{} | {:.1} mA {:.1} mW{}",
        frame.fps,
        flag(a.fps),
        joined(frame.cpu_freq_by_core.values(), ""),
        flag(a.cpu_freq),
        joined(frame.cpu_load_by_core.values(), "%"),
        flag(a.cpu_load),
        frame.gpu_freq,
        flag(a.gpu_freq),
        frame.gpu_load,
        flag(a.gpu_load),
        frame.current,
        frame.power,
        flag(a.battery),
    )
}

pub fn print_info(info: &DeviceInfo) {
    println!("  Model:       {}", info.model);
    println!("  Android:     {}", info.os_version);
    println!("  API level:   {}", info.api_level);
}
