//! HTTP control surface for a droidperf session.
//!
//! Exposes connect/start/stop/disconnect as JSON endpoints under `/api` and a
//! long-poll endpoint that hands each caller the next published telemetry
//! frame. Session operations block on bridge commands, so every handler runs
//! them on the blocking thread pool.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use droidperf_core::control::{
    BridgeStatus, ConnectRequest, ControlResponse, ControlSurface, DeviceList, StartRequest,
};
use droidperf_core::publisher::BroadcastPublisher;

/// Long-poll wait when the caller does not specify one.
const DEFAULT_POLL_MS: u64 = 5_000;
const MIN_POLL_MS: u64 = 100;
const MAX_POLL_MS: u64 = 30_000;

/// Shared server state.
struct AppState {
    control: ControlSurface,
    frames: Arc<BroadcastPublisher>,
}

#[derive(Deserialize)]
struct PollParams {
    /// Milliseconds to wait for the next frame.
    timeout_ms: Option<u64>,
}

type Rejection = (StatusCode, Json<ControlResponse>);

/// Run a session operation off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, Rejection>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        log::error!("control task failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ControlResponse::failed("Internal error")),
        )
    })
}

/// Decode an optional JSON body; an empty body means all defaults.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Rejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ControlResponse::failed(format!("Invalid request body: {e}"))),
        )
    })
}

async fn handle_check_adb(State(state): State<Arc<AppState>>) -> Result<Json<BridgeStatus>, Rejection> {
    let control = state.control.clone();
    blocking(move || control.check_bridge()).await.map(Json)
}

async fn handle_devices(State(state): State<Arc<AppState>>) -> Result<Json<DeviceList>, Rejection> {
    let control = state.control.clone();
    blocking(move || control.devices()).await.map(Json)
}

async fn handle_device_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ControlResponse>, Rejection> {
    let control = state.control.clone();
    blocking(move || control.device_info()).await.map(Json)
}

async fn handle_connect(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ControlResponse>, Rejection> {
    let request: ConnectRequest = parse_body(&body)?;
    let control = state.control.clone();
    blocking(move || control.connect(&request)).await.map(Json)
}

async fn handle_start(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ControlResponse>, Rejection> {
    let request: StartRequest = parse_body(&body)?;
    let control = state.control.clone();
    blocking(move || control.start_monitoring(&request))
        .await
        .map(Json)
}

async fn handle_stop(State(state): State<Arc<AppState>>) -> Result<Json<ControlResponse>, Rejection> {
    let control = state.control.clone();
    blocking(move || control.stop_monitoring()).await.map(Json)
}

async fn handle_disconnect(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ControlResponse>, Rejection> {
    let control = state.control.clone();
    blocking(move || control.disconnect()).await.map(Json)
}

/// Wait for the next frame published after this request arrived.
///
/// 204 when none arrives in time; frames published earlier are not replayed.
async fn handle_performance_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PollParams>,
) -> Response {
    let timeout = Duration::from_millis(
        params
            .timeout_ms
            .unwrap_or(DEFAULT_POLL_MS)
            .clamp(MIN_POLL_MS, MAX_POLL_MS),
    );
    let frames = state.frames.subscribe();
    match blocking(move || frames.recv_timeout(timeout)).await {
        Ok(Ok(frame)) => Json(frame).into_response(),
        Ok(Err(_)) => StatusCode::NO_CONTENT.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "droidperf",
        "version": droidperf_core::VERSION,
        "endpoints": {
            "/api/check_adb": "GET: whether the adb bridge answers and lists a device",
            "/api/devices": "GET: attached devices in the `device` state",
            "/api/device_info": "GET: model, OS version and API level of the connected device",
            "/api/connect": {
                "method": "POST",
                "body": {"wireless": "bool (default false)", "ip": "device IP for wireless"},
            },
            "/api/start_monitoring": {
                "method": "POST",
                "body": {"interval": "seconds between frames (default 1.0)"},
            },
            "/api/stop_monitoring": "POST",
            "/api/disconnect": "POST",
            "/api/performance_data": {
                "method": "GET",
                "description": "Long-poll for the next telemetry frame (204 on timeout)",
                "params": {"timeout_ms": "100-30000, default 5000"},
            },
        }
    }))
}

/// Build the axum router.
pub fn build_router(control: ControlSurface, frames: Arc<BroadcastPublisher>) -> Router {
    let state = Arc::new(AppState { control, frames });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/check_adb", get(handle_check_adb))
        .route("/api/devices", get(handle_devices))
        .route("/api/device_info", get(handle_device_info))
        .route("/api/connect", post(handle_connect))
        .route("/api/start_monitoring", post(handle_start))
        .route("/api/stop_monitoring", post(handle_stop))
        .route("/api/disconnect", post(handle_disconnect))
        .route("/api/performance_data", get(handle_performance_data))
        .with_state(state)
}

/// Serve the control surface until the listener fails.
///
/// `frames` must be the publisher the session behind `control` publishes to.
pub async fn run_server(
    control: ControlSurface,
    frames: Arc<BroadcastPublisher>,
    host: &str,
    port: u16,
) -> std::io::Result<()> {
    let app = build_router(control, frames);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("droidperf server listening on http://{addr}");
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidperf_core::config::SessionConfig;
    use droidperf_core::publisher::TelemetryPublisher;
    use droidperf_core::session::DeviceSession;
    use droidperf_core::shell::ScriptedShell;

    fn state(fake: ScriptedShell) -> Arc<AppState> {
        let frames = Arc::new(BroadcastPublisher::new());
        let session = DeviceSession::with_config(
            Arc::new(fake),
            frames.clone(),
            SessionConfig::immediate(),
        );
        Arc::new(AppState {
            control: ControlSurface::new(Arc::new(session)),
            frames,
        })
    }

    fn wired() -> ScriptedShell {
        ScriptedShell::new()
            .with_output("version", "Android Debug Bridge version 1.0.41")
            .with_output("devices", "List of devices attached\nR3CN70\tdevice\n")
            .with_output("disconnect", "")
    }

    #[tokio::test]
    async fn check_and_list() {
        let s = state(wired());
        let Json(status) = handle_check_adb(State(s.clone())).await.unwrap();
        assert!(status.available);
        let Json(list) = handle_devices(State(s)).await.unwrap();
        assert_eq!(list.devices.len(), 1);
        assert_eq!(list.devices[0].as_str(), "R3CN70");
    }

    #[tokio::test]
    async fn empty_body_connects_wired() {
        let s = state(wired());
        let Json(resp) = handle_connect(State(s.clone()), Bytes::new()).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("Connected to device: R3CN70"));

        let Json(info) = handle_device_info(State(s)).await.unwrap();
        assert!(info.success);
        assert!(info.device_info.is_some());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let s = state(wired());
        let (status, Json(resp)) =
            handle_connect(State(s), Bytes::from_static(b"{wireless"))
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!resp.success);
    }

    #[tokio::test]
    async fn wireless_without_ip_is_refused() {
        let s = state(ScriptedShell::new());
        let Json(resp) = handle_connect(
            State(s),
            Bytes::from_static(br#"{"wireless": true, "ip": ""}"#),
        )
        .await
        .unwrap();
        assert!(!resp.success);
        assert_eq!(
            resp.message.as_deref(),
            Some("Please provide the device IP address")
        );
    }

    #[tokio::test]
    async fn start_stop_disconnect() {
        let s = state(wired());
        let Json(resp) = handle_start(State(s.clone()), Bytes::new()).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("No device connected"));

        handle_connect(State(s.clone()), Bytes::new()).await.unwrap();
        let Json(resp) = handle_start(State(s.clone()), Bytes::from_static(br#"{"interval": 0.5}"#))
            .await
            .unwrap();
        assert!(resp.success);
        let Json(resp) = handle_stop(State(s.clone())).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("Monitoring stopped"));
        let Json(resp) = handle_stop(State(s.clone())).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("Monitoring is not running"));
        let Json(resp) = handle_disconnect(State(s)).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("Device disconnected"));
    }

    #[tokio::test]
    async fn long_poll_times_out_with_no_content() {
        let s = state(wired());
        let resp = handle_performance_data(
            State(s),
            Query(PollParams {
                timeout_ms: Some(1),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn long_poll_returns_next_frame() {
        let s = state(wired());
        let publisher = s.frames.clone();
        let poll = tokio::spawn(handle_performance_data(
            State(s.clone()),
            Query(PollParams {
                timeout_ms: Some(5_000),
            }),
        ));
        while s.frames.subscriber_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let frame = droidperf_core::TelemetryFrame::compose(
            1.0,
            droidperf_core::MetricsSample {
                fps: droidperf_core::MetricValue::acquired(42),
                cpu_freq: droidperf_core::MetricValue::fallback(Default::default()),
                cpu_load: droidperf_core::MetricValue::fallback(Default::default()),
                gpu_freq: droidperf_core::MetricValue::fallback(400),
                gpu_load: droidperf_core::MetricValue::fallback(0),
                battery: droidperf_core::MetricValue::fallback(Default::default()),
            },
        );
        publisher.publish(&frame);
        let resp = poll.await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
