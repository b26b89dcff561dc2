//! Foreground frame rate.
//!
//! Primary source is the compositor's latency history: after clearing it and
//! waiting one settle period, every frame presented in the window shows up as
//! one line below the refresh-period header. The fallback resets the focused
//! app's frame statistics and reads the rendered-frame counter back.

use std::cell::OnceCell;

use super::MetricSampler;
use crate::metric::{MetricValue, StrategyChain, StrategyFailure, StrategyResult};
use crate::shell::ShellTarget;

/// Reported when no strategy produces a plausible count.
pub const DEFAULT_FPS: u32 = 60;

/// Counts at or above this are treated as garbage, not as a fast panel.
pub const FPS_CEILING: u64 = 120;

const FOCUS_MARKER: &str = "mCurrentFocus";
const TOTAL_FRAMES_MARKER: &str = "Total frames rendered";

/// Windows probed for latency data when the focused package has none.
const FALLBACK_WINDOWS: &[&str] = &["com.android.systemui", "com.android.launcher3", "StatusBar"];

/// Accept only counts strictly between zero and [`FPS_CEILING`].
pub fn plausible_fps(count: u64) -> StrategyResult<u32> {
    if count > 0 && count < FPS_CEILING {
        Ok(count as u32)
    } else {
        Err(StrategyFailure::OutOfRange(count as i64))
    }
}

/// Package owning the focused window, from a window-manager dump.
///
/// The focus line looks like
/// `mCurrentFocus=Window{4f1c u0 com.example.game/com.example.game.Main}`;
/// the package is the last whitespace-separated token before the `/`.
pub fn focused_package(window_dump: &str) -> Option<String> {
    let line = window_dump.lines().find(|l| l.contains(FOCUS_MARKER))?;
    let (head, _) = line.split_once('/')?;
    let package = head.split_whitespace().last()?;
    let package = package.rsplit(['{', '=']).next().unwrap_or(package);
    (!package.is_empty()).then(|| package.to_string())
}

/// Windows to query for latency data, in order, without duplicates.
pub fn candidate_windows(focused: Option<&str>) -> Vec<String> {
    let mut windows: Vec<String> = vec!["SurfaceView".to_string()];
    windows.extend(focused.map(str::to_string));
    for name in FALLBACK_WINDOWS {
        if !windows.iter().any(|w| w == name) {
            windows.push((*name).to_string());
        }
    }
    windows
}

/// Frames presented according to one `--latency` dump.
///
/// The first line is the refresh period; each following line is one frame.
pub fn latency_frame_count(output: &str) -> StrategyResult<u32> {
    if output.to_ascii_lowercase().contains("not found") {
        return Err(StrategyFailure::NotFound(output.trim().to_string()));
    }
    let lines = output.lines().filter(|l| !l.trim().is_empty()).count();
    plausible_fps(lines.saturating_sub(1) as u64)
}

/// Value of the `Total frames rendered:` line of a gfx statistics dump.
pub fn gfx_total_frames(output: &str) -> StrategyResult<u32> {
    let line = output
        .lines()
        .find(|l| l.contains(TOTAL_FRAMES_MARKER))
        .ok_or_else(|| StrategyFailure::NotFound(TOTAL_FRAMES_MARKER.to_string()))?;
    let raw = line
        .split(':')
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| StrategyFailure::Parse(line.to_string()))?;
    let count: u64 = raw
        .parse()
        .map_err(|_| StrategyFailure::Parse(raw.to_string()))?;
    plausible_fps(count)
}

impl MetricSampler {
    /// Frames presented during the last settle window.
    pub fn fps(&self) -> MetricValue<u32> {
        let target = self.target();
        let focus = OnceCell::new();
        let focused = || {
            focus
                .get_or_init(|| {
                    target
                        .shell(&["dumpsys", "window"])
                        .ok()
                        .and_then(|dump| focused_package(&dump))
                })
                .as_deref()
        };
        StrategyChain::new("fps")
            .then("compositor latency", || self.latency_fps(&target, focused))
            .then("gfx frame stats", || self.gfx_fps(&target, focused()))
            .or_default(DEFAULT_FPS)
    }

    fn latency_fps<'f>(
        &self,
        target: &ShellTarget<'_>,
        focused: impl FnOnce() -> Option<&'f str>,
    ) -> StrategyResult<u32> {
        target.shell(&["dumpsys", "SurfaceFlinger", "--latency-clear"])?;
        self.settle();
        for window in candidate_windows(focused()) {
            match target.shell(&["dumpsys", "SurfaceFlinger", "--latency", &window]) {
                Ok(out) => match latency_frame_count(&out) {
                    Ok(count) => return Ok(count),
                    Err(e) => log::trace!("fps: window {window}: {e}"),
                },
                Err(e) => log::trace!("fps: window {window}: {e}"),
            }
        }
        Err(StrategyFailure::NotFound(
            "no window with plausible latency data".to_string(),
        ))
    }

    fn gfx_fps(&self, target: &ShellTarget<'_>, focused: Option<&str>) -> StrategyResult<u32> {
        let package =
            focused.ok_or_else(|| StrategyFailure::NotFound("focused package".to_string()))?;
        target.shell(&["dumpsys", "gfxinfo", package, "reset"])?;
        self.settle();
        let out = target.shell(&["dumpsys", "gfxinfo", package])?;
        gfx_total_frames(&out)
    }
}
