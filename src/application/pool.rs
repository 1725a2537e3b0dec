use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::Receiver<Task>>>;

/// Fixed set of workers draining a bounded FIFO queue.
///
/// Admission is lossy: [`WorkerPool::submit`] never waits. When the queue is
/// full the task is discarded and a warning is logged. Workers share one
/// receiver, so each queued task runs exactly once on whichever worker frees
/// up first.
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl WorkerPool {
    /// Spawns `workers` tokio tasks. Must be called from within a runtime.
    pub fn new(workers: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let receiver: SharedReceiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|id| tokio::spawn(run_worker(id, receiver.clone())))
            .collect();

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(handles),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueues a task without blocking; drops it if the queue is full.
    pub fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("worker pool is shutting down, task discarded");
            return;
        };

        match sender.try_send(Box::pin(task)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(capacity = self.capacity, "worker pool queue full, task discarded");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("worker pool has no running workers, task discarded");
            }
        }
    }

    /// Closes the queue and waits for every queued and in-flight task.
    ///
    /// Tasks are never interrupted; a task that never finishes keeps this
    /// future pending.
    pub async fn wait(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let handles = std::mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker exited abnormally");
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks waiting in the queue, excluding the ones being run.
    pub fn queued(&self) -> usize {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |sender| self.capacity - sender.capacity())
    }

    /// Total submissions discarded since start.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

async fn run_worker(id: usize, receiver: SharedReceiver) {
    loop {
        let task = receiver.lock().await.recv().await;
        let Some(task) = task else {
            break;
        };
        // Run on its own task so a panic costs one payment, not the worker.
        if let Err(e) = tokio::spawn(task).await {
            warn!(worker = id, error = %e, "task panicked");
        }
    }
    debug!(worker = id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};
    use tokio::sync::{Notify, oneshot};

    fn counter_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_runs_all_tasks_and_drains_on_wait() {
        let pool = WorkerPool::new(4, 100);
        let completed = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            pool.submit(counter_task(&completed));
        }
        pool.wait().await;

        assert_eq!(completed.load(Ordering::SeqCst), 50);
        assert_eq!(pool.dropped(), 0);
    }

    #[tokio::test]
    async fn test_drops_excess_when_workers_are_blocked() {
        let pool = WorkerPool::new(1, 2);
        let completed = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let (started_tx, started_rx) = oneshot::channel();

        let (g, c) = (gate.clone(), completed.clone());
        pool.submit(async move {
            started_tx.send(()).ok();
            g.notified().await;
            c.fetch_add(1, Ordering::SeqCst);
        });
        started_rx.await.unwrap();

        let start = Instant::now();
        for _ in 0..10 {
            pool.submit(counter_task(&completed));
        }
        assert!(start.elapsed() < Duration::from_millis(100), "submit must not block");
        assert_eq!(pool.queued(), 2);
        assert_eq!(pool.dropped(), 8);

        gate.notify_one();
        pool.wait().await;
        assert_eq!(completed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_submit_after_wait_is_discarded() {
        let pool = WorkerPool::new(2, 4);
        pool.wait().await;

        let completed = Arc::new(AtomicUsize::new(0));
        pool.submit(counter_task(&completed));

        assert_eq!(pool.dropped(), 1);
        assert_eq!(pool.queued(), 0);
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_kill_worker() {
        let pool = WorkerPool::new(1, 4);
        let completed = Arc::new(AtomicUsize::new(0));

        pool.submit(async { panic!("boom") });
        pool.submit(counter_task(&completed));
        pool.wait().await;

        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }
}
