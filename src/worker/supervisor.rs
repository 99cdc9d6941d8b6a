//! Restart-on-failure supervision for long-running consume sessions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{error, info, warn};

use super::consumer::SessionEnd;
use crate::error::AppError;

/// Liveness of a supervised worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkerStatus {
    Starting,
    Running,
    Restarting { attempt: u32 },
    Stopped,
}

/// Lets a session announce that it is consuming.
#[derive(Clone)]
pub struct StatusReporter {
    tx: Arc<watch::Sender<WorkerStatus>>,
}

impl StatusReporter {
    pub fn running(&self) {
        self.set(WorkerStatus::Running);
    }

    fn set(&self, status: WorkerStatus) {
        self.tx.send_replace(status);
    }

    fn current(&self) -> WorkerStatus {
        *self.tx.borrow()
    }
}

/// One connect-and-consume attempt.
///
/// `run` returns when `shutdown` flips to `true`, when the broker ends the
/// stream, or on error. The supervisor restarts it in the last two cases.
#[async_trait]
pub trait Session: Send + Sync + 'static {
    async fn run(
        &self,
        reporter: &StatusReporter,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SessionEnd, AppError>;
}

/// Delay schedule between restarts.
#[derive(Debug, Clone, Copy)]
pub struct RestartPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

impl RestartPolicy {
    /// `base`, `2 * base`, `4 * base` ... capped at `max`.
    fn delays(&self) -> impl Iterator<Item = Duration> {
        let factor = (self.base.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max)
    }
}

/// Snapshot view of a worker's status, cloneable into application state.
#[derive(Clone)]
pub struct WorkerProbe {
    name: &'static str,
    status: watch::Receiver<WorkerStatus>,
}

impl WorkerProbe {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn status(&self) -> WorkerStatus {
        *self.status.borrow()
    }

    pub fn is_alive(&self) -> bool {
        self.status() == WorkerStatus::Running
    }
}

/// Owner handle of a supervised worker.
pub struct WorkerHandle {
    probe: WorkerProbe,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerHandle {
    pub fn status(&self) -> WorkerStatus {
        self.probe.status()
    }

    pub fn is_alive(&self) -> bool {
        self.probe.is_alive()
    }

    pub fn probe(&self) -> WorkerProbe {
        self.probe.clone()
    }

    /// Signals shutdown and waits for the current message to finish.
    pub async fn stop(&self) {
        self.shutdown.send_replace(true);

        if let Some(task) = self.task.lock().await.take()
            && let Err(e) = task.await
        {
            error!(worker = self.probe.name, error = %e, "Supervisor task failed");
        }
    }
}

/// Spawns `session` under a supervisor that restarts it whenever it fails,
/// panics or loses its stream, until [`WorkerHandle::stop`] is called.
///
/// The restart delay grows per consecutive failure and resets once a session
/// reaches [`WorkerStatus::Running`]. Dropping the returned handle without
/// calling `stop` also stops the worker once its current session ends.
///
/// Recovery from a panicking session relies on unwinding; the release profile
/// must not set `panic = "abort"`.
pub fn spawn_supervised<S: Session>(
    name: &'static str,
    session: Arc<S>,
    policy: RestartPolicy,
) -> WorkerHandle {
    let (status_tx, status_rx) = watch::channel(WorkerStatus::Starting);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = StatusReporter {
        tx: Arc::new(status_tx),
    };

    let task = tokio::spawn(supervise(name, session, policy, reporter, shutdown_rx));

    WorkerHandle {
        probe: WorkerProbe {
            name,
            status: status_rx,
        },
        shutdown: shutdown_tx,
        task: Mutex::new(Some(task)),
    }
}

async fn supervise<S: Session>(
    name: &'static str,
    session: Arc<S>,
    policy: RestartPolicy,
    reporter: StatusReporter,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut delays = policy.delays();
    let mut attempt = 0u32;

    info!(worker = name, "Worker starting");

    while !*shutdown.borrow_and_update() {
        // Own task so a panic in the session surfaces as a JoinError.
        let run = {
            let session = session.clone();
            let reporter = reporter.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { session.run(&reporter, shutdown).await })
        };

        let outcome = run.await;

        if reporter.current() == WorkerStatus::Running {
            delays = policy.delays();
            attempt = 0;
        }

        match outcome {
            Ok(Ok(SessionEnd::Shutdown)) => break,
            Ok(Ok(SessionEnd::StreamClosed)) => {
                warn!(worker = name, "Delivery stream closed by broker");
            }
            Ok(Err(e)) => {
                error!(worker = name, error = %e, "Worker session failed");
            }
            Err(e) => {
                error!(worker = name, error = %e, "Worker session panicked");
            }
        }

        attempt = attempt.saturating_add(1);
        let delay = delays.next().unwrap_or(policy.max);
        reporter.set(WorkerStatus::Restarting { attempt });
        warn!(
            worker = name,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Restarting worker"
        );

        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() {
                    info!(worker = name, "Worker handle dropped");
                    break;
                }
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    reporter.set(WorkerStatus::Stopped);
    info!(worker = name, "Worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails `failures` times, then runs until shutdown.
    struct FlakySession {
        failures: usize,
        panic_first: bool,
        runs: AtomicUsize,
    }

    impl FlakySession {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                panic_first: false,
                runs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Session for FlakySession {
        async fn run(
            &self,
            reporter: &StatusReporter,
            mut shutdown: watch::Receiver<bool>,
        ) -> Result<SessionEnd, AppError> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst);
            if run == 0 && self.panic_first {
                panic!("session blew up");
            }
            if run < self.failures {
                return Err(AppError::dependency("broker unreachable", json!({})));
            }

            reporter.running();
            while !*shutdown.borrow_and_update() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            Ok(SessionEnd::Shutdown)
        }
    }

    fn fast_policy() -> RestartPolicy {
        RestartPolicy {
            base: Duration::from_millis(10),
            max: Duration::from_millis(40),
        }
    }

    async fn wait_for(handle: &WorkerHandle, want: WorkerStatus) {
        let mut rx = handle.probe.status.clone();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == want))
            .await
            .expect("status not reached")
            .unwrap();
    }

    #[test]
    fn test_restart_delays_grow_and_cap() {
        let policy = RestartPolicy {
            base: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        let delays: Vec<_> = policy.delays().take(5).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(500),
                Duration::from_millis(500),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_recovers_after_failures() {
        let session = Arc::new(FlakySession::new(3));
        let handle = spawn_supervised("test", session.clone(), fast_policy());

        wait_for(&handle, WorkerStatus::Running).await;
        assert!(handle.is_alive());
        assert_eq!(session.runs.load(Ordering::SeqCst), 4);

        handle.stop().await;
        assert_eq!(handle.status(), WorkerStatus::Stopped);
        assert!(!handle.is_alive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_survives_panic() {
        let session = Arc::new(FlakySession {
            failures: 0,
            panic_first: true,
            runs: AtomicUsize::new(0),
        });
        let handle = spawn_supervised("test", session.clone(), fast_policy());

        wait_for(&handle, WorkerStatus::Running).await;
        assert_eq!(session.runs.load(Ordering::SeqCst), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_restart_delay() {
        let session = Arc::new(FlakySession::new(usize::MAX));
        let handle = spawn_supervised("test", session, fast_policy());

        wait_for(&handle, WorkerStatus::Restarting { attempt: 1 }).await;
        handle.stop().await;

        assert_eq!(handle.status(), WorkerStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_stops_worker_during_restart_delay() {
        let session = Arc::new(FlakySession::new(usize::MAX));
        let policy = RestartPolicy {
            base: Duration::from_secs(60),
            max: Duration::from_secs(60),
        };
        let handle = spawn_supervised("test", session.clone(), policy);
        let mut status = handle.probe.status.clone();

        wait_for(&handle, WorkerStatus::Restarting { attempt: 1 }).await;
        drop(handle);

        tokio::time::timeout(
            Duration::from_secs(1),
            status.wait_for(|s| *s == WorkerStatus::Stopped),
        )
        .await
        .expect("worker kept running after its handle was dropped")
        .ok();
        assert_eq!(*status.borrow(), WorkerStatus::Stopped);
        assert_eq!(session.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let value = serde_json::to_value(WorkerStatus::Restarting { attempt: 2 }).unwrap();
        assert_eq!(value, json!({ "state": "restarting", "attempt": 2 }));
    }
}
