use std::sync::Arc;

use droidperf_core::{BroadcastPublisher, ControlSurface, DeviceSession};

use super::BridgeOptions;

pub fn run(opts: &BridgeOptions<'_>, host: &str, port: u16) {
    let publisher = Arc::new(BroadcastPublisher::new());
    let session = DeviceSession::new(super::make_shell(opts), publisher.clone());
    let control = ControlSurface::new(Arc::new(session));

    let base = format!("http://{host}:{port}");
    println!("droidperf server v{}", droidperf_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET  /api/check_adb         adb reachable with a device attached");
    println!("     GET  /api/devices           Ready devices");
    println!("     GET  /api/device_info       Info for the connected device");
    println!("     POST /api/connect           {{\"wireless\": bool, \"ip\": \"...\"}}");
    println!("     POST /api/start_monitoring  {{\"interval\": seconds}}");
    println!("     POST /api/stop_monitoring");
    println!("     POST /api/disconnect");
    println!("     GET  /api/performance_data  Long-poll for the next frame (?timeout_ms=)");
    println!();
    println!("   Examples:");
    println!("     curl -X POST {base}/api/connect");
    println!("     curl -X POST -d '{{\"interval\": 0.5}}' {base}/api/start_monitoring");
    println!("     curl {base}/api/performance_data");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => super::fail(e),
    };
    if let Err(e) = rt.block_on(droidperf_server::run_server(control, publisher, host, port)) {
        super::fail(format!("server on {base} stopped: {e}"));
    }
}
