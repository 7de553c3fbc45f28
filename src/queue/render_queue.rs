use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::queue::worker;
use crate::queue::{Admission, QueueStatus, RenderJob, WaitOutcome};
use crate::render::Renderer;
use crate::repositories::LinkStore;

/// Deduplicating render queue with a fixed worker pool.
///
/// A URL is in flight from the moment it is admitted until its job
/// completes; while in flight, further submissions for it are ignored and
/// callers can wait for the outcome instead of polling. Jobs travel through
/// a bounded FIFO buffer; admission never blocks and a full buffer drops the
/// job.
#[derive(Clone)]
pub struct RenderQueue {
    inner: Arc<Shared>,
}

struct Shared {
    state: RwLock<QueueState>,
    receiver: Arc<Mutex<mpsc::Receiver<RenderJob>>>,
    /// Jobs sitting in the buffer; counted before the send so it never underflows
    buffered: AtomicUsize,
    capacity: usize,
    worker_count: usize,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

struct QueueState {
    /// `None` once shut down
    sender: Option<mpsc::Sender<RenderJob>>,
    in_flight: HashSet<String>,
    waiters: HashMap<String, Vec<Waiter>>,
    next_waiter_id: u64,
}

struct Waiter {
    id: u64,
    signal: oneshot::Sender<()>,
}

impl RenderQueue {
    /// Create a queue without starting any workers
    pub fn new(worker_count: usize, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(QueueState {
                    sender: Some(sender),
                    in_flight: HashSet::new(),
                    waiters: HashMap::new(),
                    next_waiter_id: 0,
                }),
                receiver: Arc::new(Mutex::new(receiver)),
                buffered: AtomicUsize::new(0),
                capacity: capacity.max(1),
                worker_count,
                workers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a queue and start its worker pool
    pub async fn start(
        worker_count: usize,
        capacity: usize,
        store: Arc<dyn LinkStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let queue = Self::new(worker_count, capacity);
        queue.spawn_workers(store, renderer).await;
        queue
    }

    /// Start the worker pool. Has no effect if workers are already running.
    pub async fn spawn_workers(&self, store: Arc<dyn LinkStore>, renderer: Arc<dyn Renderer>) {
        let mut workers = self.inner.workers.lock().await;
        if !workers.is_empty() {
            tracing::warn!("Render workers already started, ignoring");
            return;
        }

        for worker_id in 0..self.inner.worker_count {
            workers.push(tokio::spawn(worker::run(
                worker_id,
                self.clone(),
                store.clone(),
                renderer.clone(),
            )));
        }

        tracing::info!(
            workers = self.inner.worker_count,
            capacity = self.inner.capacity,
            "Initialized render queue"
        );
    }

    /// Admit a render job for `original_url` unless one is already in flight.
    ///
    /// Never blocks. When the buffer is full the job is dropped and the URL
    /// released again, so no waiter is ever left hanging on it.
    pub async fn submit(&self, short_code: &str, original_url: &str) -> Admission {
        let mut guard = self.inner.state.write().await;
        let state = &mut *guard;

        let Some(sender) = state.sender.as_ref() else {
            tracing::warn!(url = %original_url, short_code = %short_code, "Render queue is shut down, not queuing");
            return Admission::ShutDown;
        };

        if state.in_flight.contains(original_url) {
            tracing::debug!(url = %original_url, "URL already being rendered, not queuing duplicate");
            return Admission::AlreadyInFlight;
        }

        state.in_flight.insert(original_url.to_string());
        self.inner.buffered.fetch_add(1, Ordering::SeqCst);

        match sender.try_send(RenderJob::new(short_code, original_url)) {
            Ok(()) => {
                tracing::info!(url = %original_url, short_code = %short_code, "Queued render job");
                Admission::Queued
            }
            Err(err) => {
                self.inner.buffered.fetch_sub(1, Ordering::SeqCst);
                state.in_flight.remove(original_url);

                match err {
                    TrySendError::Full(_) => {
                        tracing::warn!(
                            url = %original_url,
                            capacity = self.inner.capacity,
                            "Render queue is full, dropping job"
                        );
                        Admission::Dropped
                    }
                    TrySendError::Closed(_) => {
                        tracing::warn!(url = %original_url, "Render queue closed, dropping job");
                        Admission::ShutDown
                    }
                }
            }
        }
    }

    /// Wait until the in-flight job for `original_url` finishes.
    ///
    /// Returns `NotInFlight` straight away when nothing is being rendered for
    /// the URL; callers re-read the link store to tell "never submitted" from
    /// "already done". A timeout only stops the waiting, the render goes on.
    pub async fn wait_for_render(&self, original_url: &str, timeout: Duration) -> WaitOutcome {
        let (signal, done) = oneshot::channel();

        let waiter_id = {
            let mut state = self.inner.state.write().await;
            if !state.in_flight.contains(original_url) {
                tracing::debug!(url = %original_url, "URL not in progress, no need to wait");
                return WaitOutcome::NotInFlight;
            }

            let id = state.next_waiter_id;
            state.next_waiter_id += 1;
            let waiters = state.waiters.entry(original_url.to_string()).or_default();
            waiters.push(Waiter { id, signal });
            tracing::debug!(url = %original_url, waiters = waiters.len(), "Waiting for render");
            id
        };

        match tokio::time::timeout(timeout, done).await {
            // The sender is only dropped unsent if the queue itself went away
            Ok(_) => WaitOutcome::Completed,
            Err(_) => {
                self.remove_waiter(original_url, waiter_id).await;
                tracing::debug!(url = %original_url, timeout = ?timeout, "Wait for render timed out");
                WaitOutcome::TimedOut
            }
        }
    }

    async fn remove_waiter(&self, original_url: &str, waiter_id: u64) {
        let mut state = self.inner.state.write().await;
        if let Some(waiters) = state.waiters.get_mut(original_url) {
            waiters.retain(|w| w.id != waiter_id);
            if waiters.is_empty() {
                state.waiters.remove(original_url);
            }
        }
    }

    /// Whether a job for `original_url` is admitted and not yet completed
    pub async fn is_in_flight(&self, original_url: &str) -> bool {
        self.inner.state.read().await.in_flight.contains(original_url)
    }

    pub async fn status_snapshot(&self) -> QueueStatus {
        let state = self.inner.state.read().await;

        let mut in_progress_urls: Vec<String> = state.in_flight.iter().cloned().collect();
        in_progress_urls.sort();

        QueueStatus {
            worker_count: self.inner.worker_count,
            queue_length: self.inner.buffered.load(Ordering::SeqCst),
            in_progress_count: state.in_flight.len(),
            in_progress_urls,
            waiting_callers: state.waiters.values().map(Vec::len).sum(),
        }
    }

    /// Stop accepting jobs. Buffered and running jobs still finish.
    pub async fn shutdown(&self) {
        let mut state = self.inner.state.write().await;
        if state.sender.take().is_some() {
            tracing::info!(
                buffered = self.inner.buffered.load(Ordering::SeqCst),
                "Render queue shutdown initiated"
            );
        }
    }

    pub async fn is_shut_down(&self) -> bool {
        self.inner.state.read().await.sender.is_none()
    }

    /// Wait up to `grace` for the workers to drain after `shutdown`.
    ///
    /// Returns `false` if some worker was still busy when the grace period
    /// ran out.
    pub async fn join_workers(&self, grace: Duration) -> bool {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.inner.workers.lock().await);
        let count = handles.len();

        match tokio::time::timeout(grace, futures::future::join_all(handles)).await {
            Ok(results) => {
                for result in results.into_iter().filter_map(Result::err) {
                    tracing::error!(error = %result, "Render worker ended abnormally");
                }
                tracing::info!(workers = count, "Render workers drained");
                true
            }
            Err(_) => {
                tracing::warn!(grace = ?grace, "Render workers still busy after grace period");
                false
            }
        }
    }

    /// Next buffered job; `None` once shut down and drained
    pub(crate) async fn next_job(&self) -> Option<RenderJob> {
        let job = {
            let mut receiver = self.inner.receiver.lock().await;
            receiver.recv().await
        }?;
        self.inner.buffered.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }

    /// Release every waiter for `original_url` and take it out of flight.
    ///
    /// Both happen under one write lock, so a caller arriving afterwards
    /// sees the URL as not in flight instead of waiting on a signal that
    /// will never come. Returns how many waiters were still listening.
    pub(crate) async fn complete(&self, original_url: &str) -> usize {
        let mut state = self.inner.state.write().await;

        let mut notified = 0;
        for waiter in state.waiters.remove(original_url).unwrap_or_default() {
            // A waiter that already gave up has dropped its receiver
            if waiter.signal.send(()).is_ok() {
                notified += 1;
            }
        }
        state.in_flight.remove(original_url);

        notified
    }
}
