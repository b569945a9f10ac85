use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Background ticker that signals when an automatic checkpoint is due
///
/// The spawned task only posts ticks; the crawl loop drains them with
/// [`due`](Self::due) and performs the save itself. Ticks that arrive while
/// one is already pending are coalesced.
pub struct CheckpointTimer {
    ticks: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl CheckpointTimer {
    /// Starts ticking every `interval`, first tick one interval from now
    pub fn start(interval: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
        });

        Self { ticks, handle }
    }

    /// Returns true if at least one tick arrived since the last call
    pub fn due(&mut self) -> bool {
        let mut due = false;
        while self.ticks.try_recv().is_ok() {
            due = true;
        }
        due
    }

    /// Stops the background task
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for CheckpointTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_due_before_interval() {
        let mut timer = CheckpointTimer::start(Duration::from_secs(60));
        assert!(!timer.due());
    }

    #[tokio::test]
    async fn test_due_after_interval() {
        let mut timer = CheckpointTimer::start(Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(timer.due());
    }

    #[tokio::test]
    async fn test_cancel_stops_ticks() {
        let mut timer = CheckpointTimer::start(Duration::from_millis(20));
        timer.cancel();
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!timer.due());
    }
}
