use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use droidperf_core::BroadcastPublisher;

use super::BridgeOptions;

/// How often the loop below re-checks the Ctrl+C flag.
const POLL: Duration = Duration::from_millis(100);

pub fn run(
    opts: &BridgeOptions<'_>,
    ip: Option<&str>,
    interval: f64,
    json: bool,
    count: Option<u64>,
) {
    let interval = super::parse_interval(interval);
    let publisher = Arc::new(BroadcastPublisher::new());
    let frames = publisher.subscribe();
    let session = super::make_session(opts, publisher.clone());
    let info = super::connect(&session, ip);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    if !json {
        println!(
            "Monitoring {} every {:.2}s (Ctrl+C to stop, ~ marks estimates)",
            info.model,
            interval.as_secs_f64()
        );
    }
    if let Err(e) = session.start_monitoring(interval) {
        super::fail(e);
    }

    let mut printed = 0u64;
    while running.load(Ordering::SeqCst) {
        if count.is_some_and(|n| printed >= n) {
            break;
        }
        match frames.recv_timeout(POLL) {
            Ok(frame) => {
                if json {
                    match serde_json::to_string(&frame) {
                        Ok(line) => println!("{line}"),
                        Err(e) => log::warn!("frame not serializable: {e}"),
                    }
                } else {
                    println!("{}", super::format_frame_line(&frame));
                }
                printed += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Err(e) = session.disconnect() {
        log::warn!("disconnect: {e}");
    }
    if !json {
        println!("Stopped after {printed} frame(s)");
    }
}
