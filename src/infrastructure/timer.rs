//! Tokio-backed countdown timers
//!
//! Each run is a spawned task sleeping until its deadline; stopping aborts
//! the task. The deadline is fixed when `start` is called, not when the task
//! is first polled.

use crate::domain::timer::{ExpiryCallback, Timer, TimerFactory, TimerKind};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

pub struct TokioTimer {
    kind: TimerKind,
    interval: Duration,
    on_expiry: ExpiryCallback,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
}

impl TokioTimer {
    pub fn new(
        kind: TimerKind,
        interval: Duration,
        on_expiry: ExpiryCallback,
        runtime: Handle,
    ) -> Self {
        Self {
            kind,
            interval,
            on_expiry,
            runtime,
            task: None,
        }
    }
}

impl Timer for TokioTimer {
    fn kind(&self) -> TimerKind {
        self.kind
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn start(&mut self, epoch: u64) -> bool {
        if self.is_running() {
            return false;
        }

        let kind = self.kind;
        let deadline = Instant::now() + self.interval;
        let on_expiry = self.on_expiry.clone();
        self.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            debug!("Timer {} fired (epoch {})", kind, epoch);
            on_expiry(kind, epoch);
        }));
        true
    }

    fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                was_running
            }
            None => false,
        }
    }

    fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Creates [`TokioTimer`]s on a given runtime
#[derive(Clone)]
pub struct TokioTimerFactory {
    runtime: Handle,
}

impl TokioTimerFactory {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Factory for the runtime the caller is running on, if any
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl TimerFactory for TokioTimerFactory {
    fn create(
        &self,
        kind: TimerKind,
        interval: Duration,
        on_expiry: ExpiryCallback,
    ) -> Box<dyn Timer> {
        Box::new(TokioTimer::new(kind, interval, on_expiry, self.runtime.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_timer(
        kind: TimerKind,
        interval: Duration,
    ) -> (Box<dyn Timer>, Arc<Mutex<Vec<(TimerKind, u64)>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let callback: ExpiryCallback = Arc::new(move |kind, epoch| {
            sink.lock().unwrap().push((kind, epoch));
        });
        let factory = TokioTimerFactory::current().expect("runtime");
        (factory.create(kind, interval, callback), fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_interval() {
        let (mut timer, fired) = recording_timer(TimerKind::NoReply, Duration::from_millis(15_000));
        assert!(timer.start(1));
        assert!(timer.is_running());
        assert!(!timer.start(2));

        tokio::time::sleep(Duration::from_millis(14_999)).await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock().unwrap(), vec![(TimerKind::NoReply, 1)]);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fired.lock().unwrap().len(), 1);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels() {
        let (mut timer, fired) = recording_timer(TimerKind::Released, Duration::from_millis(5_000));
        assert!(!timer.stop());
        assert!(timer.start(7));

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(timer.stop());
        assert!(!timer.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_fire() {
        let (mut timer, fired) = recording_timer(TimerKind::Released, Duration::from_millis(100));
        timer.start(1);
        tokio::time::sleep(Duration::from_millis(150)).await;

        timer.set_interval(Duration::from_millis(200));
        assert_eq!(timer.interval(), Duration::from_millis(200));
        assert!(timer.start(2));
        tokio::time::sleep(Duration::from_millis(250)).await;

        let epochs: Vec<u64> = fired.lock().unwrap().iter().map(|(_, e)| *e).collect();
        assert_eq!(epochs, vec![1, 2]);
    }
}
