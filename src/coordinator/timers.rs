use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use crate::errors::CoordError;
use super::orchestrator::Coordinator;

/// A fired timer: task id and the generation it was scheduled with.
pub type Fired = (String, u64);

/// Count of outstanding work: running attempts, armed timers and retries
/// being handed from one to the other. Each handoff takes its new count
/// before releasing the old one, so zero means nothing is left to run.
#[derive(Debug, Clone, Default)]
pub struct Activity(Arc<AtomicUsize>);

impl Activity {
    fn begin(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self, n: usize) {
        self.0.fetch_sub(n, Ordering::SeqCst);
    }

    pub(crate) fn hold(&self) -> ActivityHold {
        self.begin();
        ActivityHold(self.clone())
    }

    pub fn is_idle(&self) -> bool {
        self.0.load(Ordering::SeqCst) == 0
    }
}

pub(crate) struct ActivityHold(Activity);

impl Drop for ActivityHold {
    fn drop(&mut self) {
        self.0.end(1);
    }
}

/// Pending retry timers keyed by task id. At most one timer per task; a new
/// schedule replaces the old one. Expired timers send the task id to the
/// dispatcher channel and stay counted as pending until the dispatcher calls
/// `finish` or the retry attempt starts.
pub struct RetryTimers {
    timers: Arc<DashMap<String, (u64, CancellationToken)>>,
    generation: AtomicU64,
    fire_tx: mpsc::UnboundedSender<Fired>,
    activity: Activity,
}

impl RetryTimers {
    pub fn new(fire_tx: mpsc::UnboundedSender<Fired>, activity: Activity) -> Self {
        Self {
            timers: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            fire_tx,
            activity,
        }
    }

    pub fn schedule(&self, task_id: &str, delay: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        match self.timers.insert(task_id.to_string(), (generation, token.clone())) {
            Some((_, previous)) => previous.cancel(),
            None => self.activity.begin(),
        }

        let tx = self.fire_tx.clone();
        let id = task_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(task_id = %id, "Retry timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    if tx.send((id, generation)).is_err() {
                        debug!("Retry dispatcher gone, dropping timer");
                    }
                }
            }
        });
    }

    /// Returns whether a timer was pending for `task_id`.
    pub fn cancel(&self, task_id: &str) -> bool {
        match self.timers.remove(task_id) {
            Some((_, (_, token))) => {
                token.cancel();
                self.activity.end(1);
                true
            }
            None => false,
        }
    }

    /// Drop the entry of a fired timer unless it has since been replaced.
    pub fn finish(&self, task_id: &str, generation: u64) {
        if self.timers.remove_if(task_id, |_, (g, _)| *g == generation).is_some() {
            self.activity.end(1);
        }
    }

    pub fn cancel_all(&self) {
        let mut removed = 0;
        self.timers.retain(|_, (_, token)| {
            token.cancel();
            removed += 1;
            false
        });
        self.activity.end(removed);
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        self.timers.contains_key(task_id)
    }
}

impl Drop for RetryTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Runs retries as their timers fire. Holds only a weak handle so that
/// dropping the coordinator ends the loop.
pub(crate) async fn run_retry_dispatcher(
    coordinator: Weak<Coordinator>,
    mut fired: mpsc::UnboundedReceiver<Fired>,
) {
    while let Some((task_id, generation)) = fired.recv().await {
        let Some(coordinator) = coordinator.upgrade() else { break };
        tokio::spawn(async move {
            match coordinator.process_task(&task_id).await {
                Ok(outcome) => debug!(task_id = %task_id, ?outcome, "Retry processed"),
                Err(CoordError::TaskNotFound(_)) => debug!(task_id = %task_id, "Retried task no longer exists"),
                Err(e) => warn!(task_id = %task_id, error = %e, "Retry dispatch failed"),
            }
            coordinator.timers().finish(&task_id, generation);
        });
    }
    debug!("Retry dispatcher stopped");
}
