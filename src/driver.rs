//! Step driver - a repeating timer that walks the bar through its steps.
//!
//! The driver never touches the engine. It emits the next index over a
//! channel and the render loop applies it, so the engine stays owned by the
//! thread that paints it. Dropping the [`DriverHandle`] cancels the timer.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Default tick interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Event emitted on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    /// Move the bar to this step
    Advance(usize),
}

/// Index after `current`, wrapping back to 0 after the last step
pub fn next_index(current: Option<usize>, step_count: usize) -> usize {
    match current {
        Some(index) if index + 1 < step_count => index + 1,
        _ => 0,
    }
}

/// Repeating task that cycles through `step_count` steps
pub struct StepDriver {
    step_count: usize,
    interval: Duration,
    /// Last index emitted
    current: Option<usize>,
    /// Wait a full interval before the first tick
    delay_first: bool,
    event_tx: mpsc::UnboundedSender<DriverEvent>,
    shutdown_rx: Option<mpsc::Receiver<()>>,
}

impl StepDriver {
    pub fn new(step_count: usize, event_tx: mpsc::UnboundedSender<DriverEvent>) -> Self {
        Self {
            step_count,
            interval: DEFAULT_INTERVAL,
            current: None,
            delay_first: false,
            event_tx,
            shutdown_rx: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Continue after `current` instead of starting at step 0.
    ///
    /// The first advance happens one interval from now.
    pub fn resume_from(mut self, current: Option<usize>) -> Self {
        self.current = current;
        self.delay_first = true;
        self
    }

    pub fn with_shutdown(mut self, rx: mpsc::Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the tick loop until shutdown or until nobody is listening
    #[instrument(skip(self), fields(steps = self.step_count))]
    pub async fn run(&mut self) {
        if self.step_count == 0 {
            warn!("step driver has no steps to cycle, not starting");
            return;
        }
        if self.interval.is_zero() {
            warn!("step driver interval is zero, not starting");
            return;
        }

        info!("step driver started, interval: {:?}", self.interval);

        let start = if self.delay_first {
            Instant::now() + self.interval
        } else {
            Instant::now()
        };
        let mut interval = time::interval_at(start, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let next = next_index(self.current, self.step_count);
                    if self.event_tx.send(DriverEvent::Advance(next)).is_err() {
                        debug!("step driver receiver closed");
                        break;
                    }
                    self.current = Some(next);
                }
                _ = async {
                    if let Some(ref mut rx) = self.shutdown_rx {
                        rx.recv().await
                    } else {
                        std::future::pending::<Option<()>>().await
                    }
                } => {
                    info!("step driver shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn onto the current tokio runtime
    pub fn spawn(self) -> DriverHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let mut driver = self.with_shutdown(shutdown_rx);
        let task = tokio::spawn(async move { driver.run().await });
        DriverHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running driver; the timer cannot outlive it
pub struct DriverHandle {
    shutdown_tx: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DriverHandle {
    /// Ask the driver to stop and wait for it to finish
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("step driver task failed: {}", e);
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_index_wraps() {
        assert_eq!(next_index(None, 3), 0);
        assert_eq!(next_index(Some(0), 3), 1);
        assert_eq!(next_index(Some(1), 3), 2);
        assert_eq!(next_index(Some(2), 3), 0);
        assert_eq!(next_index(Some(0), 1), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_cycles_through_steps() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = StepDriver::new(3, tx)
            .with_interval(Duration::from_millis(2000))
            .spawn();

        let mut seen = Vec::new();
        for _ in 0..5 {
            match rx.recv().await {
                Some(DriverEvent::Advance(i)) => seen.push(i),
                None => break,
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 0, 1]);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = StepDriver::new(4, tx).spawn();

        let started = Instant::now();
        assert_eq!(rx.recv().await, Some(DriverEvent::Advance(0)));
        assert_eq!(started.elapsed(), Duration::ZERO);

        assert_eq!(rx.recv().await, Some(DriverEvent::Advance(1)));
        assert_eq!(started.elapsed(), DEFAULT_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_waits_one_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = StepDriver::new(4, tx)
            .with_interval(Duration::from_millis(500))
            .resume_from(Some(3))
            .spawn();

        let started = Instant::now();
        assert_eq!(rx.recv().await, Some(DriverEvent::Advance(0)));
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = StepDriver::new(2, tx).spawn();

        assert_eq!(rx.recv().await, Some(DriverEvent::Advance(0)));
        drop(handle);

        // The aborted task drops its sender, closing the channel
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_finishes_task() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = StepDriver::new(2, tx).spawn();
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_driver_ends_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut driver = StepDriver::new(3, tx).with_interval(Duration::from_millis(1));
        // Returns as soon as the first send fails
        driver.run().await;
    }

    #[tokio::test]
    async fn test_zero_steps_does_not_start() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = StepDriver::new(0, tx);
        driver.run().await;
        drop(driver);
        assert_eq!(rx.recv().await, None);
    }
}
