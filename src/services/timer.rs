use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::debug;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periodic producer posting a message into a channel.
///
/// The ticker never touches the session; it only feeds the owner's command queue.
/// It holds the queue weakly, so it stops once every strong sender is gone.
/// Dropping it aborts the producer task.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Idle ticker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post `message()` into `sink` every `period`, first one a full period from now.
    ///
    /// Restarting an already running ticker replaces the previous producer.
    pub fn start<T, F>(&mut self, period: Duration, sink: mpsc::WeakSender<T>, message: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        self.stop();

        let period = period.max(MIN_PERIOD);
        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let Some(sender) = sink.upgrade() else {
                    debug!("tick sink released; stopping ticker");
                    break;
                };
                if sender.send(message()).await.is_err() {
                    debug!("tick sink closed; stopping ticker");
                    break;
                }
            }
        }));
    }

    /// Abort the producer; no tick is posted afterwards.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a producer is currently attached.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn posts_once_per_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), tx.downgrade(), || "tick");

        sleep(Duration::from_millis(3_500)).await;
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
        assert!(ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), tx.downgrade(), || ());

        sleep(Duration::from_millis(1_500)).await;
        assert!(rx.try_recv().is_ok());

        ticker.stop();
        assert!(!ticker.is_running());
        sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_stops_it() {
        let (tx, mut rx) = mpsc::channel::<()>(8);
        {
            let mut ticker = Ticker::new();
            ticker.start(Duration::from_secs(1), tx.downgrade(), || ());
        }
        sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn releasing_every_sender_stops_the_ticker() {
        let (tx, mut rx) = mpsc::channel::<()>(8);
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), tx.downgrade(), || ());

        sleep(Duration::from_millis(1_500)).await;
        assert!(rx.try_recv().is_ok());

        drop(tx);
        sleep(Duration::from_secs(2)).await;
        assert!(!ticker.is_running());
        assert!(rx.recv().await.is_none());
    }
}
