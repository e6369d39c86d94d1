use std::{sync::Arc, time::Duration};

use greenhouse_common::SensorSnapshot;
use thiserror::Error;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::client::{ClientError, SnapshotSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PollerError {
    #[error("poller can only start from Idle (currently {0:?})")]
    NotIdle(PollState),
}

/// Periodic `/status` reader.
///
/// One task runs the cycles back to back: fetch, deliver, then wait the full
/// interval. Failures are delivered and never end the loop. Callbacks run
/// while the state lock is held, so once [`Poller::stop`] returns no callback
/// is running and none will run again.
pub struct Poller<S> {
    source: Arc<S>,
    state: Arc<Mutex<PollState>>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl<S: SnapshotSource> Poller<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            source,
            state: Arc::new(Mutex::new(PollState::Idle)),
            shutdown,
            task: None,
        }
    }

    pub async fn state(&self) -> PollState {
        *self.state.lock().await
    }

    pub async fn start<F, E>(
        &mut self,
        interval: Duration,
        on_snapshot: F,
        on_error: E,
    ) -> Result<(), PollerError>
    where
        F: FnMut(SensorSnapshot) + Send + 'static,
        E: FnMut(ClientError) + Send + 'static,
    {
        {
            let mut state = self.state.lock().await;
            if *state != PollState::Idle {
                return Err(PollerError::NotIdle(*state));
            }
            *state = PollState::Running;
        }

        info!(interval_ms = interval.as_millis() as u64, "polling started");
        self.task = Some(tokio::spawn(run_cycles(
            self.source.clone(),
            interval,
            self.state.clone(),
            self.shutdown.subscribe(),
            on_snapshot,
            on_error,
        )));
        Ok(())
    }

    /// Stops the loop. A fetch already in flight may finish, but its result
    /// is dropped.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if *state == PollState::Stopped {
            return;
        }
        *state = PollState::Stopped;
        self.shutdown.send_replace(true);
        info!("polling stopped");
    }

    /// Waits for the polling task to exit after [`Poller::stop`].
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("polling task ended abnormally: {err}");
            }
        }
    }
}

async fn run_cycles<S, F, E>(
    source: Arc<S>,
    interval: Duration,
    state: Arc<Mutex<PollState>>,
    mut shutdown: watch::Receiver<bool>,
    mut on_snapshot: F,
    mut on_error: E,
) where
    S: SnapshotSource,
    F: FnMut(SensorSnapshot) + Send + 'static,
    E: FnMut(ClientError) + Send + 'static,
{
    let mut cycle: u64 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }
        cycle = cycle.saturating_add(1);

        let result = source.fetch_snapshot().await;

        {
            let state = state.lock().await;
            if *state == PollState::Stopped {
                debug!(cycle, "discarding poll result received after stop");
                break;
            }
            match result {
                Ok(snapshot) => on_snapshot(snapshot),
                Err(err) => {
                    warn!(cycle, "status poll failed: {err}");
                    on_error(err);
                }
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.wait_for(|stopped| *stopped) => break,
        }
    }

    debug!(cycles = cycle, "polling task exiting");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::{mpsc, Notify};

    use super::*;

    #[derive(Debug)]
    enum Event {
        Snapshot(SensorSnapshot),
        Error(ClientError),
    }

    fn snapshot(co2: i64) -> SensorSnapshot {
        SensorSnapshot {
            temperature: 20.0,
            humidity: 80.0,
            co2,
            humidifier_active: false,
            ventilation_active: false,
            leds_active: false,
            timestamp: "N/A".to_string(),
            transition_kind: None,
        }
    }

    fn callbacks(
        tx: mpsc::UnboundedSender<Event>,
    ) -> (
        impl FnMut(SensorSnapshot) + Send + 'static,
        impl FnMut(ClientError) + Send + 'static,
    ) {
        let error_tx = tx.clone();
        (
            move |snapshot: SensorSnapshot| {
                let _ = tx.send(Event::Snapshot(snapshot));
            },
            move |err: ClientError| {
                let _ = error_tx.send(Event::Error(err));
            },
        )
    }

    /// Fails a fixed number of times, then succeeds forever.
    struct FlakySource {
        failures_left: Mutex<usize>,
        calls: AtomicUsize,
    }

    impl SnapshotSource for FlakySource {
        async fn fetch_snapshot(&self) -> Result<SensorSnapshot, ClientError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let mut failures_left = self.failures_left.lock().await;
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(ClientError::Transport("connection refused".to_string()));
            }
            Ok(snapshot(call as i64))
        }
    }

    /// Blocks every fetch until released.
    struct GatedSource {
        entered: Notify,
        release: Notify,
    }

    impl SnapshotSource for GatedSource {
        async fn fetch_snapshot(&self) -> Result<SensorSnapshot, ClientError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(snapshot(400))
        }
    }

    /// Tracks how many fetches overlap.
    struct SlowSource {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SnapshotSource for SlowSource {
        async fn fetch_snapshot(&self) -> Result<SensorSnapshot, ClientError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(15)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(snapshot(500))
        }
    }

    #[tokio::test]
    async fn consecutive_failures_never_stop_the_loop() {
        const FAILURES: usize = 4;
        let source = Arc::new(FlakySource {
            failures_left: Mutex::new(FAILURES),
            calls: AtomicUsize::new(0),
        });
        let mut poller = Poller::new(source.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (on_snapshot, on_error) = callbacks(tx);

        poller
            .start(Duration::from_millis(5), on_snapshot, on_error)
            .await
            .unwrap();

        for _ in 0..FAILURES {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, Event::Error(ClientError::Transport(_))), "{event:?}");
            assert_eq!(poller.state().await, PollState::Running);
        }
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::Snapshot(ref s) if s.co2 == FAILURES as i64), "{event:?}");

        poller.stop().await;
        poller.join().await;
        assert_eq!(poller.state().await, PollState::Stopped);
    }

    #[tokio::test]
    async fn result_in_flight_at_stop_is_discarded() {
        let source = Arc::new(GatedSource {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let mut poller = Poller::new(source.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (on_snapshot, on_error) = callbacks(tx);

        poller
            .start(Duration::from_millis(5), on_snapshot, on_error)
            .await
            .unwrap();
        source.entered.notified().await;

        poller.stop().await;
        source.release.notify_one();
        poller.join().await;

        assert!(rx.recv().await.is_none(), "no callback may run after stop");
    }

    #[tokio::test]
    async fn cycles_never_overlap() {
        let source = Arc::new(SlowSource {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let mut poller = Poller::new(source.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (on_snapshot, on_error) = callbacks(tx);

        poller
            .start(Duration::from_millis(1), on_snapshot, on_error)
            .await
            .unwrap();
        for _ in 0..5 {
            assert!(matches!(rx.recv().await, Some(Event::Snapshot(_))));
        }
        poller.stop().await;
        poller.join().await;

        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_interrupts_the_wait() {
        let source = Arc::new(FlakySource {
            failures_left: Mutex::new(0),
            calls: AtomicUsize::new(0),
        });
        let mut poller = Poller::new(source.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (on_snapshot, on_error) = callbacks(tx);

        poller
            .start(Duration::from_secs(3_600), on_snapshot, on_error)
            .await
            .unwrap();
        assert!(matches!(rx.recv().await, Some(Event::Snapshot(_))));

        poller.stop().await;
        tokio::time::timeout(Duration::from_secs(1), poller.join())
            .await
            .expect("stop must end the wait promptly");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_is_only_legal_from_idle() {
        let source = Arc::new(FlakySource {
            failures_left: Mutex::new(0),
            calls: AtomicUsize::new(0),
        });
        let mut poller = Poller::new(source);
        assert_eq!(poller.state().await, PollState::Idle);

        let (tx, _rx) = mpsc::unbounded_channel();
        let (on_snapshot, on_error) = callbacks(tx.clone());
        poller
            .start(Duration::from_secs(60), on_snapshot, on_error)
            .await
            .unwrap();

        let (on_snapshot, on_error) = callbacks(tx.clone());
        let err = poller
            .start(Duration::from_secs(60), on_snapshot, on_error)
            .await
            .unwrap_err();
        assert_eq!(err, PollerError::NotIdle(PollState::Running));

        poller.stop().await;
        poller.join().await;

        let (on_snapshot, on_error) = callbacks(tx);
        let err = poller
            .start(Duration::from_secs(60), on_snapshot, on_error)
            .await
            .unwrap_err();
        assert_eq!(err, PollerError::NotIdle(PollState::Stopped));
    }
}
