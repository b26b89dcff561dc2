//! Fan-out of telemetry frames to observers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Mutex, PoisonError};

use crate::frame::TelemetryFrame;

/// Receives one frame per tick.
pub trait TelemetryPublisher: Send + Sync {
    fn publish(&self, frame: &TelemetryFrame);
}

impl<F> TelemetryPublisher for F
where
    F: Fn(&TelemetryFrame) + Send + Sync,
{
    fn publish(&self, frame: &TelemetryFrame) {
        self(frame)
    }
}

/// Delivers each frame to every current subscriber.
///
/// Each subscriber holds at most one undelivered frame; a slow observer
/// misses frames instead of queueing them. Dropped receivers are pruned on
/// the next publish.
#[derive(Default)]
pub struct BroadcastPublisher {
    subscribers: Mutex<Vec<SyncSender<TelemetryFrame>>>,
    published: AtomicU64,
}

impl BroadcastPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive frames published from now on.
    pub fn subscribe(&self) -> Receiver<TelemetryFrame> {
        let (tx, rx) = mpsc::sync_channel(1);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Frames published since creation.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl TelemetryPublisher for BroadcastPublisher {
    fn publish(&self, frame: &TelemetryFrame) {
        self.published.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| match tx.try_send(frame.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("subscriber lagging, frame dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
