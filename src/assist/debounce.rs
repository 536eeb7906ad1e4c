//! Quiescence-window debounce lane.
//!
//! A [`DebounceLane`] coalesces rapid input changes into one dispatch: every
//! [`push`](DebounceLane::push) resets the timer, and only after the window
//! passes with no further pushes does the handler run with the **last**
//! value.  Each lane is an independent tokio task, so two lanes (primary
//! transcript and image-edit instruction) never cancel each other.
//!
//! The handler is awaited inside the lane task, which also serialises
//! dispatches: at most one handler invocation is in flight per lane, and
//! values pushed meanwhile coalesce into the next one.
//!
//! Dropping the lane aborts the task, so a lane can never fire after its
//! owner has been torn down.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug)]
enum LaneMsg {
    Value(String),
    Cancel,
}

/// Detached feed handle for tasks that outlive a borrow of the lane (e.g.
/// the voice-routing task).  Pushes behave exactly like
/// [`DebounceLane::push`].
#[derive(Debug, Clone)]
pub struct LaneFeed {
    tx: mpsc::Sender<LaneMsg>,
}

impl LaneFeed {
    pub fn push(&self, value: impl Into<String>) {
        let _ = self.tx.try_send(LaneMsg::Value(value.into()));
    }
}

/// Handle to a running debounce lane.
#[derive(Debug)]
pub struct DebounceLane {
    tx: mpsc::Sender<LaneMsg>,
    handle: JoinHandle<()>,
}

impl DebounceLane {
    /// Spawn a lane with the given quiescence `window`.
    ///
    /// `handler` runs once per quiet period with the last pushed value.
    pub fn spawn<F, Fut>(window: Duration, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<LaneMsg>(32);

        let handle = tokio::spawn(async move {
            let timer = tokio::time::sleep(window);
            tokio::pin!(timer);
            let mut pending: Option<String> = None;

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(LaneMsg::Value(value)) => {
                            pending = Some(value);
                            timer.as_mut().reset(Instant::now() + window);
                        }
                        Some(LaneMsg::Cancel) => {
                            pending = None;
                        }
                        None => break,
                    },
                    // Guarded so a completed timer is not re-polled while
                    // nothing is pending.
                    () = timer.as_mut(), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            handler(value).await;
                        }
                    }
                }
            }
        });

        Self { tx, handle }
    }

    /// Feed the lane a new value, resetting the quiescence timer.
    ///
    /// Uses `try_send`; if the lane is saturated the oldest queued values
    /// already carry stale text, so dropping the push is harmless.
    pub fn push(&self, value: impl Into<String>) {
        let _ = self.tx.try_send(LaneMsg::Value(value.into()));
    }

    /// Discard whatever is waiting on the timer without firing it.  Used
    /// when the assist dialog closes or re-targets so a pending dispatch
    /// cannot fire against the wrong field.
    pub fn cancel(&self) {
        let _ = self.tx.try_send(LaneMsg::Cancel);
    }

    /// Detached feed handle for the voice-routing task.
    pub fn feed(&self) -> LaneFeed {
        LaneFeed {
            tx: self.tx.clone(),
        }
    }

    /// Abort the lane task.  Pending and in-flight dispatches are dropped.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for DebounceLane {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting_lane(window_ms: u64) -> (DebounceLane, mpsc::Receiver<String>) {
        let (seen_tx, seen_rx) = mpsc::channel(16);
        let lane = DebounceLane::spawn(Duration::from_millis(window_ms), move |value| {
            let seen = seen_tx.clone();
            async move {
                let _ = seen.send(value).await;
            }
        });
        (lane, seen_rx)
    }

    /// Changes every 200 ms for 900 ms must dispatch exactly once, with the
    /// last value.
    #[tokio::test(start_paused = true)]
    async fn coalesces_rapid_changes_into_one_dispatch() {
        let (lane, mut seen) = collecting_lane(1_000);

        for value in ["b", "bl", "blu", "blue", "blue k"] {
            lane.push(value);
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        assert_eq!(seen.recv().await.as_deref(), Some("blue k"));
        assert!(seen.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_gaps_produce_separate_dispatches() {
        let (lane, mut seen) = collecting_lane(1_000);

        lane.push("first");
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        lane.push("second");
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        assert_eq!(seen.recv().await.as_deref(), Some("first"));
        assert_eq!(seen.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_without_a_push() {
        let (_lane, mut seen) = collecting_lane(50);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(seen.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn abort_discards_pending_dispatch() {
        let (lane, mut seen) = collecting_lane(1_000);

        lane.push("doomed");
        lane.abort();
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        assert!(seen.try_recv().is_err());
    }

    /// Cancel drops the armed value but the lane stays usable.
    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_but_lane_survives() {
        let (lane, mut seen) = collecting_lane(1_000);

        lane.push("doomed");
        lane.cancel();
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert!(seen.try_recv().is_err());

        lane.push("kept");
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(seen.recv().await.as_deref(), Some("kept"));
    }

    /// Two lanes run independently — pushing one never disturbs the other.
    #[tokio::test(start_paused = true)]
    async fn lanes_are_independent() {
        let (primary, mut primary_seen) = collecting_lane(1_000);
        let (edit, mut edit_seen) = collecting_lane(1_000);

        primary.push("a kettle");
        tokio::time::sleep(Duration::from_millis(500)).await;
        edit.push("make it red");
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        assert_eq!(primary_seen.recv().await.as_deref(), Some("a kettle"));
        assert_eq!(edit_seen.recv().await.as_deref(), Some("make it red"));
    }
}
