//! Device connection lifecycle and the background sampling loop.
//!
//! A [`DeviceSession`] moves between three states:
//!
//! ```text
//! Disconnected --connect--> Connected --start--> Monitoring
//!      ^                      |   ^                 |
//!      +------disconnect------+   +------stop-------+
//!      ^                                            |
//!      +-----------------disconnect-----------------+
//! ```
//!
//! All state lives behind one mutex shared with the loop thread. The loop
//! checks it (and its [`CancelToken`]) only at tick boundaries; commands
//! already in flight for the current tick run to completion.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::device::{self, DeviceHandle, DeviceInfo, bridge_available, fetch_device_info};
use crate::error::{Result, SessionError};
use crate::frame::{TelemetryFrame, unix_secs_now};
use crate::publisher::TelemetryPublisher;
use crate::sampler::MetricSampler;
use crate::shell::{DeviceShell, ShellTarget};

/// Granularity of cancellable sleeps.
const CANCEL_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Connected,
    Monitoring,
}

/// Cooperative cancellation flag shared with the sampling loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on cancellation.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }
}

struct Monitor {
    cancel: CancelToken,
    thread: JoinHandle<()>,
}

struct Inner {
    state: SessionState,
    handle: Option<DeviceHandle>,
    info: Option<DeviceInfo>,
    monitor: Option<Monitor>,
    /// Loops that were stopped but may still be finishing their last tick.
    retired: Vec<JoinHandle<()>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One device connection and at most one sampling loop.
pub struct DeviceSession {
    shell: Arc<dyn DeviceShell>,
    publisher: Arc<dyn TelemetryPublisher>,
    config: SessionConfig,
    inner: Arc<Mutex<Inner>>,
}

impl DeviceSession {
    pub fn new(shell: Arc<dyn DeviceShell>, publisher: Arc<dyn TelemetryPublisher>) -> Self {
        Self::with_config(shell, publisher, SessionConfig::default())
    }

    pub fn with_config(
        shell: Arc<dyn DeviceShell>,
        publisher: Arc<dyn TelemetryPublisher>,
        config: SessionConfig,
    ) -> Self {
        Self {
            shell,
            publisher,
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Disconnected,
                handle: None,
                info: None,
                monitor: None,
                retired: Vec::new(),
            })),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state
    }

    pub fn device_handle(&self) -> Option<DeviceHandle> {
        lock(&self.inner).handle.clone()
    }

    pub fn check_bridge_available(&self) -> bool {
        bridge_available(self.shell.as_ref())
    }

    /// Attached devices whose status is `device`.
    pub fn list_devices(&self) -> Result<Vec<DeviceHandle>> {
        device::list_devices(self.shell.as_ref()).map_err(|e| {
            log::warn!("device listing failed: {e}");
            SessionError::BridgeUnavailable
        })
    }

    /// Connect to the first attached device.
    pub fn connect_wired(&self) -> Result<DeviceInfo> {
        self.reject_while_monitoring()?;
        let handle = self
            .list_devices()?
            .into_iter()
            .next()
            .ok_or(SessionError::NoDeviceFound)?;
        self.attach(handle)
    }

    /// Connect to a device over TCP at `ip` on the configured port.
    pub fn connect_wireless(&self, ip: &str) -> Result<DeviceInfo> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(SessionError::InvalidInput(
                "device IP address is required".to_string(),
            ));
        }
        self.reject_while_monitoring()?;

        if let Err(e) = self.shell.run(&["disconnect"]) {
            log::debug!("pre-connect disconnect failed: {e}");
        }
        let handle = DeviceHandle::wireless(ip, self.config.wireless_port);
        let reply = self.shell.run(&["connect", handle.as_str()])?;
        if !reply.to_ascii_lowercase().contains("connected") {
            return Err(SessionError::ConnectFailed(reply.trim().to_string()));
        }
        self.attach(handle)
    }

    fn reject_while_monitoring(&self) -> Result<()> {
        if lock(&self.inner).state == SessionState::Monitoring {
            return Err(SessionError::AlreadyMonitoring);
        }
        Ok(())
    }

    fn attach(&self, handle: DeviceHandle) -> Result<DeviceInfo> {
        let info = fetch_device_info(&ShellTarget::new(self.shell.as_ref(), handle.as_str()));
        let mut inner = lock(&self.inner);
        if inner.state == SessionState::Monitoring {
            return Err(SessionError::AlreadyMonitoring);
        }
        log::info!("connected to {handle} ({})", info.model);
        inner.state = SessionState::Connected;
        inner.handle = Some(handle);
        inner.info = Some(info.clone());
        Ok(info)
    }

    /// Info fetched when the current device was connected.
    pub fn device_info(&self) -> Result<DeviceInfo> {
        let inner = lock(&self.inner);
        match (&inner.handle, &inner.info) {
            (Some(_), Some(info)) => Ok(info.clone()),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Spawn the sampling loop, publishing one frame every `interval`.
    pub fn start_monitoring(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(SessionError::InvalidInput(
                "interval must be positive".to_string(),
            ));
        }
        let mut inner = lock(&self.inner);
        match inner.state {
            SessionState::Disconnected => return Err(SessionError::NotConnected),
            SessionState::Monitoring => return Err(SessionError::AlreadyMonitoring),
            SessionState::Connected => {}
        }
        let handle = inner.handle.clone().ok_or(SessionError::NotConnected)?;

        let cancel = CancelToken::new();
        let sampling = SamplingLoop {
            sampler: MetricSampler::new(
                Arc::clone(&self.shell),
                handle.clone(),
                self.config.settle_delay,
            ),
            shell: Arc::clone(&self.shell),
            publisher: Arc::clone(&self.publisher),
            inner: Arc::clone(&self.inner),
            cancel: cancel.clone(),
            interval,
            bridge_retry_delay: self.config.bridge_retry_delay,
            error_pause: self.config.error_pause,
            predecessors: std::mem::take(&mut inner.retired),
        };
        let thread = thread::Builder::new()
            .name("droidperf-sampler".to_string())
            .spawn(move || sampling.run())
            .map_err(|e| SessionError::LoopSpawn(e.to_string()))?;

        log::info!("monitoring {handle} every {interval:?}");
        inner.monitor = Some(Monitor { cancel, thread });
        inner.state = SessionState::Monitoring;
        Ok(())
    }

    /// Signal the loop to stop at its next tick boundary. Does not wait.
    pub fn stop_monitoring(&self) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.state != SessionState::Monitoring {
            return Err(SessionError::NotMonitoring);
        }
        if let Some(monitor) = inner.monitor.take() {
            monitor.cancel.cancel();
            inner.retired.push(monitor.thread);
        }
        inner.state = SessionState::Connected;
        log::info!("monitoring stopped");
        Ok(())
    }

    /// Stop any loop, release the device and return to `Disconnected`.
    ///
    /// Always issues the bridge-wide disconnect, so it also drops stale
    /// wireless connections when nothing is attached locally. Local state is
    /// cleared even when the bridge-level disconnect fails; that failure is
    /// still returned.
    pub fn disconnect(&self) -> Result<()> {
        let (monitor, retired) = {
            let mut inner = lock(&self.inner);
            inner.state = SessionState::Disconnected;
            inner.handle = None;
            inner.info = None;
            (inner.monitor.take(), std::mem::take(&mut inner.retired))
        };

        let deadline = Instant::now() + self.config.disconnect_grace;
        let mut busy = Vec::new();
        if let Some(monitor) = monitor {
            monitor.cancel.cancel();
            busy.extend(wait_for_exit(monitor.thread, deadline));
        }
        for thread in retired {
            busy.extend(wait_for_exit(thread, deadline));
        }
        // The next loop joins these before its first tick.
        lock(&self.inner).retired.extend(busy);

        let result = self.shell.run(&["disconnect"]);
        log::info!("device disconnected");
        result.map(|_| ()).map_err(SessionError::from)
    }

    /// Take one frame synchronously, outside of any loop.
    ///
    /// CPU load is primed first and measured across `spacing`.
    pub fn sample_once(&self, spacing: Duration) -> Result<TelemetryFrame> {
        let handle = self.device_handle().ok_or(SessionError::NotConnected)?;
        let mut sampler =
            MetricSampler::new(Arc::clone(&self.shell), handle, self.config.settle_delay);
        sampler.cpu_load();
        thread::sleep(spacing);
        let sample = sampler.sample();
        Ok(TelemetryFrame::compose(unix_secs_now(), sample))
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        if let Some(monitor) = lock(&self.inner).monitor.take() {
            monitor.cancel.cancel();
        }
    }
}

/// Join `thread` if it finishes before `deadline`, otherwise hand it back.
fn wait_for_exit(thread: JoinHandle<()>, deadline: Instant) -> Option<JoinHandle<()>> {
    while !thread.is_finished() {
        if Instant::now() >= deadline {
            log::warn!("sampling loop still busy after grace period");
            return Some(thread);
        }
        thread::sleep(CANCEL_POLL);
    }
    if thread.join().is_err() {
        log::warn!("sampling loop exited with a panic");
    }
    None
}

struct SamplingLoop {
    sampler: MetricSampler,
    shell: Arc<dyn DeviceShell>,
    publisher: Arc<dyn TelemetryPublisher>,
    inner: Arc<Mutex<Inner>>,
    cancel: CancelToken,
    interval: Duration,
    bridge_retry_delay: Duration,
    error_pause: Duration,
    predecessors: Vec<JoinHandle<()>>,
}

impl SamplingLoop {
    fn run(mut self) {
        // A stopped loop may still be inside its last tick.
        for previous in std::mem::take(&mut self.predecessors) {
            let _ = previous.join();
        }

        let mut last_timestamp = 0.0_f64;
        while !self.cancel.is_cancelled() {
            if lock(&self.inner).handle.is_none() {
                log::info!("device handle cleared, sampling loop exiting");
                break;
            }
            if !bridge_available(self.shell.as_ref()) {
                log::warn!("bridge unreachable, retrying in {:?}", self.bridge_retry_delay);
                if self.cancel.sleep(self.bridge_retry_delay) {
                    break;
                }
                continue;
            }

            let sampler = &mut self.sampler;
            let sample = match panic::catch_unwind(AssertUnwindSafe(|| sampler.sample())) {
                Ok(sample) => sample,
                Err(_) => {
                    log::warn!("sampling tick failed, pausing {:?}", self.error_pause);
                    if self.cancel.sleep(self.error_pause) {
                        break;
                    }
                    continue;
                }
            };
            if self.cancel.is_cancelled() {
                break;
            }

            let timestamp = unix_secs_now().max(last_timestamp);
            last_timestamp = timestamp;
            self.publisher
                .publish(&TelemetryFrame::compose(timestamp, sample));

            if self.cancel.sleep(self.interval) {
                break;
            }
        }
        log::debug!("sampling loop for {} finished", self.sampler.handle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedShell;
    use std::sync::mpsc;

    const DEVICES: &str = "List of devices attached\nR58M123ABC\tdevice\n";

    fn session(fake: &Arc<ScriptedShell>) -> DeviceSession {
        let sink = |_: &TelemetryFrame| {};
        DeviceSession::with_config(fake.clone(), Arc::new(sink), SessionConfig::immediate())
    }

    fn wired() -> Arc<ScriptedShell> {
        Arc::new(
            ScriptedShell::new()
                .with_output("version", "Android Debug Bridge version 1.0.41")
                .with_output("devices", DEVICES)
                .with_output("disconnect", "disconnected everything\n"),
        )
    }

    #[test]
    fn cancel_token_interrupts_sleep() {
        let token = CancelToken::new();
        assert!(!token.sleep(Duration::from_millis(1)));
        token.cancel();
        let started = Instant::now();
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn wired_connect_picks_first_device() {
        let fake = wired();
        let s = session(&fake);
        let info = s.connect_wired().unwrap();
        assert_eq!(info, DeviceInfo::unknown());
        assert_eq!(s.state(), SessionState::Connected);
        assert_eq!(s.device_handle(), Some(DeviceHandle::new("R58M123ABC")));
    }

    #[test]
    fn wired_connect_without_devices_fails() {
        let fake = Arc::new(ScriptedShell::new().with_output("devices", "List of devices attached\n\n"));
        let s = session(&fake);
        assert_eq!(s.connect_wired(), Err(SessionError::NoDeviceFound));
        assert_eq!(s.state(), SessionState::Disconnected);
    }

    #[test]
    fn listing_failure_is_bridge_unavailable() {
        let fake = Arc::new(ScriptedShell::new());
        assert_eq!(session(&fake).list_devices(), Err(SessionError::BridgeUnavailable));
    }

    #[test]
    fn wireless_connect_requires_confirmation() {
        let fake = Arc::new(
            ScriptedShell::new()
                .with_output("disconnect", "")
                .with_output("connect 10.0.0.7:5555", "failed to connect to '10.0.0.7:5555'"),
        );
        let s = session(&fake);
        assert!(matches!(
            s.connect_wireless("10.0.0.7"),
            Err(SessionError::ConnectFailed(_))
        ));
        assert_eq!(s.state(), SessionState::Disconnected);

        fake.set("connect 10.0.0.7:5555", Ok("connected to 10.0.0.7:5555".to_string()));
        s.connect_wireless(" 10.0.0.7 ").unwrap();
        assert_eq!(s.device_handle(), Some(DeviceHandle::new("10.0.0.7:5555")));
        assert_eq!(fake.call_count("disconnect"), 2);
    }

    #[test]
    fn empty_ip_issues_no_commands() {
        let fake = Arc::new(ScriptedShell::new());
        let s = session(&fake);
        assert!(matches!(s.connect_wireless("  "), Err(SessionError::InvalidInput(_))));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn start_requires_connection() {
        let fake = wired();
        let s = session(&fake);
        assert_eq!(
            s.start_monitoring(Duration::from_millis(10)),
            Err(SessionError::NotConnected)
        );
        assert_eq!(s.stop_monitoring(), Err(SessionError::NotMonitoring));
        assert_eq!(s.device_info(), Err(SessionError::NotConnected));
    }

    #[test]
    fn disconnect_without_device_still_resets_bridge() {
        let fake = wired();
        let s = session(&fake);
        assert_eq!(s.disconnect(), Ok(()));
        assert_eq!(s.disconnect(), Ok(()));
        assert_eq!(fake.call_count("disconnect"), 2);
        assert_eq!(s.state(), SessionState::Disconnected);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let fake = wired();
        let s = session(&fake);
        s.connect_wired().unwrap();
        assert!(matches!(
            s.start_monitoring(Duration::ZERO),
            Err(SessionError::InvalidInput(_))
        ));
        assert_eq!(s.state(), SessionState::Connected);
    }

    #[test]
    fn loop_publishes_until_stopped() {
        let fake = wired();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let sink = move |f: &TelemetryFrame| {
            let _ = tx.lock().unwrap().send(f.timestamp);
        };
        let s = DeviceSession::with_config(fake.clone(), Arc::new(sink), SessionConfig::immediate());
        s.connect_wired().unwrap();
        s.start_monitoring(Duration::from_millis(5)).unwrap();
        assert_eq!(
            s.start_monitoring(Duration::from_millis(5)),
            Err(SessionError::AlreadyMonitoring)
        );

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(second >= first);

        s.stop_monitoring().unwrap();
        assert_eq!(s.state(), SessionState::Connected);
        s.disconnect().unwrap();
        assert_eq!(s.state(), SessionState::Disconnected);
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(50));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unreachable_bridge_delays_ticks() {
        let fake = Arc::new(ScriptedShell::new().with_output("devices", DEVICES));
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let sink = move |f: &TelemetryFrame| {
            let _ = tx.lock().unwrap().send(f.timestamp);
        };
        let s = DeviceSession::with_config(fake.clone(), Arc::new(sink), SessionConfig::immediate());
        s.connect_wired().unwrap();
        s.start_monitoring(Duration::from_millis(5)).unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(s.state(), SessionState::Monitoring);

        fake.set("version", Ok("Android Debug Bridge".to_string()));
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        let _ = s.disconnect();
    }

    #[test]
    fn failed_bridge_disconnect_still_clears_state() {
        let fake = Arc::new(
            ScriptedShell::new()
                .with_output("version", "Android Debug Bridge")
                .with_output("devices", DEVICES),
        );
        let s = session(&fake);
        s.connect_wired().unwrap();
        assert!(matches!(s.disconnect(), Err(SessionError::Bridge(_))));
        assert_eq!(s.state(), SessionState::Disconnected);
        assert_eq!(s.device_handle(), None);
    }

    /// Delegates to a scripted shell, misbehaving on the first
    /// `dumpsys battery` of the run.
    struct TroubledShell {
        inner: Arc<ScriptedShell>,
        panic_on_battery: bool,
        stall: Duration,
        tripped: AtomicBool,
        stalling: AtomicBool,
        overlapped: AtomicBool,
    }

    impl TroubledShell {
        fn panicking(inner: Arc<ScriptedShell>) -> Self {
            Self::new(inner, true, Duration::ZERO)
        }

        fn stalling(inner: Arc<ScriptedShell>, stall: Duration) -> Self {
            Self::new(inner, false, stall)
        }

        fn new(inner: Arc<ScriptedShell>, panic_on_battery: bool, stall: Duration) -> Self {
            Self {
                inner,
                panic_on_battery,
                stall,
                tripped: AtomicBool::new(false),
                stalling: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
            }
        }
    }

    impl DeviceShell for TroubledShell {
        fn run(&self, args: &[&str]) -> std::result::Result<String, crate::error::ShellError> {
            let on_loop = thread::current().name() == Some("droidperf-sampler");
            if on_loop && self.stalling.load(Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            if args.ends_with(&["dumpsys", "battery"]) && !self.tripped.swap(true, Ordering::SeqCst) {
                if self.panic_on_battery {
                    panic!("battery dump handler blew up");
                }
                self.stalling.store(true, Ordering::SeqCst);
                thread::sleep(self.stall);
                self.stalling.store(false, Ordering::SeqCst);
            }
            self.inner.run(args)
        }
    }

    fn frame_channel() -> (Arc<dyn TelemetryPublisher>, mpsc::Receiver<f64>) {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let sink = move |f: &TelemetryFrame| {
            let _ = tx.lock().unwrap().send(f.timestamp);
        };
        (Arc::new(sink), rx)
    }

    #[test]
    fn panicking_tick_does_not_kill_the_loop() {
        let shell = Arc::new(TroubledShell::panicking(wired()));
        let (publisher, rx) = frame_channel();
        let s = DeviceSession::with_config(shell.clone(), publisher, SessionConfig::immediate());
        s.connect_wired().unwrap();
        s.start_monitoring(Duration::from_millis(5)).unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(shell.tripped.load(Ordering::SeqCst));
        assert_eq!(s.state(), SessionState::Monitoring);
        s.disconnect().unwrap();
    }

    #[test]
    fn loop_exits_when_handle_is_cleared() {
        let fake = wired();
        let (publisher, rx) = frame_channel();
        let s = DeviceSession::with_config(fake, publisher, SessionConfig::immediate());
        s.connect_wired().unwrap();
        s.start_monitoring(Duration::from_millis(5)).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());

        let monitor = {
            let mut inner = lock(&s.inner);
            inner.handle = None;
            inner.monitor.take().unwrap()
        };
        let deadline = Instant::now() + Duration::from_secs(5);
        while !monitor.thread.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(monitor.thread.is_finished());
        assert!(!monitor.cancel.is_cancelled());

        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn busy_loop_is_joined_by_the_next_one() {
        let shell = Arc::new(TroubledShell::stalling(wired(), Duration::from_millis(300)));
        let config = SessionConfig {
            disconnect_grace: Duration::ZERO,
            ..SessionConfig::immediate()
        };
        let (publisher, rx) = frame_channel();
        let s = DeviceSession::with_config(shell.clone(), publisher, config);
        s.connect_wired().unwrap();
        s.start_monitoring(Duration::from_millis(5)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !shell.stalling.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(shell.stalling.load(Ordering::SeqCst));

        s.disconnect().unwrap();
        assert_eq!(lock(&s.inner).retired.len(), 1);

        s.connect_wired().unwrap();
        s.start_monitoring(Duration::from_millis(5)).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(!shell.overlapped.load(Ordering::SeqCst));
        s.disconnect().unwrap();
    }

    #[test]
    fn sample_once_survives_garbage_core_range() {
        let fake = wired();
        fake.set(
            "-s R58M123ABC shell cat /sys/devices/system/cpu/possible",
            Ok("4294967295\n".to_string()),
        );
        let s = session(&fake);
        s.connect_wired().unwrap();
        let frame = s.sample_once(Duration::ZERO).unwrap();
        assert_eq!(frame.cpu_freq_by_core.len(), 8);
    }

    #[test]
    fn sample_once_needs_a_device() {
        let fake = wired();
        let s = session(&fake);
        assert_eq!(
            s.sample_once(Duration::ZERO).map(|f| f.fps),
            Err(SessionError::NotConnected)
        );
        s.connect_wired().unwrap();
        let frame = s.sample_once(Duration::ZERO).unwrap();
        assert_eq!(frame.fps, 60);
        assert!(!frame.acquired.fps);
    }
}
