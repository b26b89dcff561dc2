//! Request/response surface over a [`DeviceSession`].
//!
//! This is the JSON-shaped view a dashboard talks to: every operation returns
//! `{success, message}` with a short human-readable message instead of an
//! error, so transports (HTTP, CLI) only have to serialize the result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::interval_from_secs;
use crate::device::{DeviceHandle, DeviceInfo};
use crate::error::SessionError;
use crate::session::DeviceSession;

/// Body of a connect request. Omitted fields mean a wired connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectRequest {
    #[serde(default)]
    pub wireless: bool,
    #[serde(default)]
    pub ip: Option<String>,
}

impl ConnectRequest {
    pub fn wired() -> Self {
        Self::default()
    }

    pub fn wireless(ip: impl Into<String>) -> Self {
        Self {
            wireless: true,
            ip: Some(ip.into()),
        }
    }
}

/// Body of a start request; the interval is in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub interval: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

impl ControlResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            device_info: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            device_info: None,
        }
    }

    fn with_info(mut self, info: DeviceInfo) -> Self {
        self.device_info = Some(info);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<DeviceHandle>,
}

/// Short message for a rejected operation.
pub fn describe(err: &SessionError) -> String {
    match err {
        SessionError::BridgeUnavailable => "Device bridge is unavailable".to_string(),
        SessionError::NoDeviceFound => "No connected device found".to_string(),
        SessionError::NotConnected => "No device connected".to_string(),
        SessionError::AlreadyMonitoring => "Monitoring is already running".to_string(),
        SessionError::NotMonitoring => "Monitoring is not running".to_string(),
        SessionError::InvalidInput(reason) => format!("Invalid input: {reason}"),
        SessionError::ConnectFailed(reply) => format!("Connection failed: {reply}"),
        SessionError::LoopSpawn(reason) => format!("Could not start monitoring: {reason}"),
        SessionError::Bridge(e) => format!("Bridge command failed: {e}"),
    }
}

/// Control operations for one session, shareable across request handlers.
#[derive(Clone)]
pub struct ControlSurface {
    session: Arc<DeviceSession>,
}

impl ControlSurface {
    pub fn new(session: Arc<DeviceSession>) -> Self {
        Self { session }
    }

    pub fn check_bridge(&self) -> BridgeStatus {
        BridgeStatus {
            available: self.session.check_bridge_available(),
        }
    }

    /// Ready devices; an unreachable bridge lists nothing.
    pub fn devices(&self) -> DeviceList {
        DeviceList {
            devices: self.session.list_devices().unwrap_or_default(),
        }
    }

    pub fn device_info(&self) -> ControlResponse {
        match self.session.device_info() {
            Ok(info) => ControlResponse {
                success: true,
                message: None,
                device_info: Some(info),
            },
            Err(e) => ControlResponse::failed(describe(&e)),
        }
    }

    pub fn connect(&self, request: &ConnectRequest) -> ControlResponse {
        let result = if request.wireless {
            let ip = request.ip.as_deref().unwrap_or_default();
            if ip.trim().is_empty() {
                return ControlResponse::failed("Please provide the device IP address");
            }
            self.session.connect_wireless(ip)
        } else {
            self.session.connect_wired()
        };
        match result {
            Ok(info) => {
                let handle = self
                    .session
                    .device_handle()
                    .map(|h| h.to_string())
                    .unwrap_or_default();
                ControlResponse::ok(format!("Connected to device: {handle}")).with_info(info)
            }
            Err(SessionError::Bridge(e)) => ControlResponse::failed(format!("Connection failed: {e}")),
            Err(e) => ControlResponse::failed(describe(&e)),
        }
    }

    pub fn start_monitoring(&self, request: &StartRequest) -> ControlResponse {
        let interval = match request.interval {
            None => self.session.config().default_interval,
            Some(secs) => match interval_from_secs(secs) {
                Some(interval) => interval,
                None => {
                    return ControlResponse::failed(
                        "Interval must be a positive number of seconds",
                    );
                }
            },
        };
        match self.session.start_monitoring(interval) {
            Ok(()) => ControlResponse::ok("Monitoring started"),
            Err(e) => ControlResponse::failed(describe(&e)),
        }
    }

    pub fn stop_monitoring(&self) -> ControlResponse {
        match self.session.stop_monitoring() {
            Ok(()) => ControlResponse::ok("Monitoring stopped"),
            Err(e) => ControlResponse::failed(describe(&e)),
        }
    }

    pub fn disconnect(&self) -> ControlResponse {
        match self.session.disconnect() {
            Ok(()) => ControlResponse::ok("Device disconnected"),
            Err(SessionError::Bridge(e)) => {
                ControlResponse::failed(format!("Disconnect failed: {e}"))
            }
            Err(e) => ControlResponse::failed(describe(&e)),
        }
    }
}
