use std::{collections::HashMap, time::Duration};

use log::*;
use order_board_engine::{fade::FadeToken, order_objects::OrderId};
use tokio::{sync::mpsc, task::JoinHandle};

/// Runs the delay between marking an order as fading and committing the hide.
///
/// Each pending fade owns a timer task. When the delay elapses the token is sent back to the dashboard loop, which
/// commits it. At most one timer runs per order; scheduling a new fade replaces the old timer.
pub struct FadeTimers {
    delay: Duration,
    elapsed: mpsc::UnboundedSender<FadeToken>,
    timers: HashMap<OrderId, JoinHandle<()>>,
}

impl FadeTimers {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<FadeToken>) {
        let (elapsed, rx) = mpsc::unbounded_channel();
        (Self { delay, elapsed, timers: HashMap::new() }, rx)
    }

    pub fn schedule(&mut self, token: FadeToken) {
        let id = token.id().clone();
        let tx = self.elapsed.clone();
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone once the dashboard has shut down
            let _ = tx.send(token);
        });
        if let Some(old) = self.timers.insert(id, timer) {
            old.abort();
        }
    }

    /// Forget the timer for a fade that has been delivered
    pub fn finished(&mut self, id: &OrderId) {
        self.timers.remove(id);
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.drain().for_each(|(_, timer)| timer.abort());
        if n > 0 {
            debug!("📋️ {n} fade timers cancelled");
        }
        n
    }
}

impl Drop for FadeTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use order_board_engine::fade::FadeTracker;
    use tokio::time::timeout;

    use super::*;

    fn order_id(n: &str) -> OrderId {
        OrderId::new(n, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
    }

    #[tokio::test]
    async fn elapsed_fades_come_back() {
        let mut tracker = FadeTracker::default();
        let (mut timers, mut rx) = FadeTimers::new(Duration::from_millis(20));
        let token = tracker.begin(order_id("1"));
        timers.schedule(token.clone());
        assert_eq!(timers.timers.len(), 1);
        let received = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(received, token);
        timers.finished(received.id());
        assert!(timers.timers.is_empty());
    }

    #[tokio::test]
    async fn cancelled_fades_never_arrive() {
        let mut tracker = FadeTracker::default();
        let (mut timers, mut rx) = FadeTimers::new(Duration::from_millis(20));
        timers.schedule(tracker.begin(order_id("1")));
        timers.schedule(tracker.begin(order_id("2")));
        assert_eq!(timers.cancel_all(), 2);
        assert_eq!(timers.cancel_all(), 0);
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn rescheduling_replaces_the_old_timer() {
        let mut tracker = FadeTracker::default();
        let (mut timers, mut rx) = FadeTimers::new(Duration::from_millis(20));
        let first = tracker.begin(order_id("1"));
        let second = tracker.begin(order_id("1"));
        timers.schedule(first);
        timers.schedule(second.clone());
        assert_eq!(timers.timers.len(), 1);
        let received = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(received, second);
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }
}
