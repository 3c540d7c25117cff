//! Progress reporting and ETA estimation.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

use reel_models::ProgressUpdate;

/// Cloneable handle for emitting progress events.
///
/// Reporting is optional: a disabled sink swallows events, and a closed
/// receiver never fails the run. Events are a best-effort side channel,
/// not part of the pipeline's correctness.
#[derive(Clone)]
pub struct ProgressSink {
    tx: Option<mpsc::UnboundedSender<ProgressUpdate>>,
}

impl ProgressSink {
    /// Create a sink and the receiving end for the caller to drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit one event. Never blocks and never errors.
    pub fn emit(&self, update: ProgressUpdate) {
        if let Some(tx) = &self.tx {
            trace!(
                scene_id = %update.scene_id,
                status = %update.status,
                "Progress event"
            );
            // A dropped receiver means the caller stopped listening.
            let _ = tx.send(update);
        }
    }
}

/// Rolling estimate of time remaining for a batch.
///
/// Feeds on per-scene completion durations; the estimate is the mean
/// duration times the number of scenes still outstanding, divided by
/// the worker pool size. No estimate is produced until at least one
/// scene has completed.
#[derive(Debug)]
pub struct EtaTracker {
    total: usize,
    parallelism: usize,
    completed: usize,
    elapsed_sum: Duration,
}

impl EtaTracker {
    pub fn new(total: usize, parallelism: usize) -> Self {
        Self {
            total,
            parallelism: parallelism.max(1),
            completed: 0,
            elapsed_sum: Duration::ZERO,
        }
    }

    /// Record one finished scene and how long it took.
    pub fn record(&mut self, elapsed: Duration) {
        self.completed += 1;
        self.elapsed_sum += elapsed;
    }

    /// Estimated seconds remaining, once at least one sample exists.
    pub fn estimate(&self) -> Option<u64> {
        if self.completed == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.completed);
        let mean = self.elapsed_sum.as_secs_f64() / self.completed as f64;
        let eta = mean * remaining as f64 / self.parallelism as f64;
        Some(eta.round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::SceneId;

    #[test]
    fn test_disabled_sink_swallows_events() {
        let sink = ProgressSink::disabled();
        sink.emit(ProgressUpdate::queued(SceneId::from_string("s1"), "sunset"));
    }

    #[test]
    fn test_sink_survives_dropped_receiver() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        sink.emit(ProgressUpdate::queued(SceneId::from_string("s1"), "sunset"));
    }

    #[tokio::test]
    async fn test_channel_delivers_events() {
        let (sink, mut rx) = ProgressSink::channel();
        sink.emit(ProgressUpdate::queued(SceneId::from_string("s1"), "sunset"));
        let update = rx.recv().await.unwrap();
        assert_eq!(update.scene_id.as_str(), "s1");
    }

    #[test]
    fn test_eta_needs_a_sample() {
        let tracker = EtaTracker::new(10, 2);
        assert_eq!(tracker.estimate(), None);
    }

    #[test]
    fn test_eta_scales_with_remaining() {
        let mut tracker = EtaTracker::new(5, 1);
        tracker.record(Duration::from_secs(10));
        // 4 remaining at 10s mean
        assert_eq!(tracker.estimate(), Some(40));

        tracker.record(Duration::from_secs(20));
        // 3 remaining at 15s mean
        assert_eq!(tracker.estimate(), Some(45));
    }

    #[test]
    fn test_eta_divides_by_parallelism() {
        let mut tracker = EtaTracker::new(5, 2);
        tracker.record(Duration::from_secs(10));
        assert_eq!(tracker.estimate(), Some(20));
    }

    #[test]
    fn test_eta_zero_when_done() {
        let mut tracker = EtaTracker::new(1, 2);
        tracker.record(Duration::from_secs(10));
        assert_eq!(tracker.estimate(), Some(0));
    }
}
