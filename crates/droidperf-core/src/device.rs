//! Device discovery and descriptive info.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ShellError;
use crate::shell::{DeviceShell, ShellTarget};

/// Sentinel for a descriptive field the device did not report.
pub const UNKNOWN: &str = "unknown";

/// Header line printed by `adb devices`.
const DEVICES_HEADER: &str = "List of devices attached";

/// Identifier of a connected device: a serial, or `ip:port` for wireless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceHandle(String);

impl DeviceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Handle for a device reached over TCP.
    pub fn wireless(ip: &str, port: u16) -> Self {
        Self(format!("{ip}:{port}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive device properties, fetched once per connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// `"<brand> <model>"`.
    pub model: String,
    /// Android release, e.g. `"14"`.
    pub os_version: String,
    /// SDK level, e.g. `"34"`.
    pub api_level: String,
}

impl DeviceInfo {
    pub fn unknown() -> Self {
        Self {
            model: UNKNOWN.to_string(),
            os_version: UNKNOWN.to_string(),
            api_level: UNKNOWN.to_string(),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Read model, release and SDK level from system properties.
pub fn fetch_device_info(target: &ShellTarget<'_>) -> DeviceInfo {
    let brand = target.getprop("ro.product.brand");
    let model = target.getprop("ro.product.model");
    let model = match (brand, model) {
        (Some(brand), Some(model)) => format!("{brand} {model}"),
        (None, Some(model)) => model,
        (Some(brand), None) => brand,
        (None, None) => UNKNOWN.to_string(),
    };
    DeviceInfo {
        model,
        os_version: target
            .getprop("ro.build.version.release")
            .unwrap_or_else(|| UNKNOWN.to_string()),
        api_level: target
            .getprop("ro.build.version.sdk")
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

/// Handles from `adb devices` output whose status is exactly `device`.
///
/// `unauthorized`, `offline` and daemon chatter lines are dropped.
pub fn parse_device_list(output: &str) -> Vec<DeviceHandle> {
    output
        .lines()
        .filter_map(|line| {
            let (id, status) = line.split_once('\t')?;
            let id = id.trim();
            (status.trim() == "device" && !id.is_empty()).then(|| DeviceHandle::new(id))
        })
        .collect()
}

/// Query the bridge for attached devices in the `device` state.
pub fn list_devices(shell: &dyn DeviceShell) -> Result<Vec<DeviceHandle>, ShellError> {
    shell.run(&["devices"]).map(|out| parse_device_list(&out))
}

/// True when `adb devices` output lists at least one entry under its header.
pub fn has_device_entries(output: &str) -> bool {
    output.contains(DEVICES_HEADER) && output.trim().lines().count() > 1
}

/// The bridge answers `version` and its device listing is non-empty.
pub fn bridge_available(shell: &dyn DeviceShell) -> bool {
    if let Err(e) = shell.run(&["version"]) {
        log::debug!("bridge version check failed: {e}");
        return false;
    }
    match shell.run(&["devices"]) {
        Ok(out) => has_device_entries(&out),
        Err(e) => {
            log::debug!("bridge device listing failed: {e}");
            false
        }
    }
}
