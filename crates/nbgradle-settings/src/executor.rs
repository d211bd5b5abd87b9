//! Single-threaded FIFO workers used to deliver settings notifications.
//!
//! Two process-wide workers exist: one dispatching document-level changes (tree replacement,
//! property commits) and one delivering value-changed callbacks to property listeners. Both are
//! started lazily on first use.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Sender};
use parking_lot::{Condvar, Mutex};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    sender: Sender<Job>,
    thread_id: ThreadId,
}

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn begin(&self) {
        *self.count.lock() += 1;
    }

    fn end(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// A named worker thread running submitted tasks one at a time, in submission order.
pub struct TaskExecutor {
    name: &'static str,
    worker: OnceLock<Option<Worker>>,
    pending: Arc<Pending>,
}

impl TaskExecutor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            worker: OnceLock::new(),
            pending: Arc::new(Pending::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        self.pending.begin();
        let job: Job = Box::new(task);
        let job = match self.worker() {
            Some(worker) => match worker.sender.send(job) {
                Ok(()) => return,
                Err(err) => err.into_inner(),
            },
            None => job,
        };

        // No worker to hand the task to; run it on the caller's thread instead.
        run_job(self.name, job);
        self.pending.end();
    }

    /// Whether the current thread is this executor's worker.
    pub fn is_worker_thread(&self) -> bool {
        self.worker
            .get()
            .and_then(Option::as_ref)
            .is_some_and(|worker| worker.thread_id == thread::current().id())
    }

    pub fn is_idle(&self) -> bool {
        *self.pending.count.lock() == 0
    }

    /// Blocks until every task submitted so far (and every task those tasks submit) has run.
    ///
    /// Returns `false` if the timeout elapsed first, or when called from the worker itself,
    /// where waiting could never succeed.
    pub fn wait_for_pending(&self, timeout: Duration) -> bool {
        if self.is_worker_thread() {
            return false;
        }

        let deadline = Instant::now() + timeout;
        let mut count = self.pending.count.lock();
        while *count > 0 {
            if self.pending.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }

    fn worker(&self) -> Option<&Worker> {
        self.worker
            .get_or_init(|| spawn_worker(self.name, Arc::clone(&self.pending)))
            .as_ref()
    }
}

impl std::fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("name", &self.name)
            .field("pending", &*self.pending.count.lock())
            .finish()
    }
}

fn spawn_worker(name: &'static str, pending: Arc<Pending>) -> Option<Worker> {
    let (sender, receiver) = unbounded::<Job>();
    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            for job in receiver {
                run_job(name, job);
                pending.end();
            }
        });

    match spawned {
        Ok(handle) => Some(Worker {
            sender,
            thread_id: handle.thread().id(),
        }),
        Err(err) => {
            tracing::error!(
                target: "nbgradle.settings",
                executor = name,
                error = %err,
                "failed to spawn executor thread; running tasks inline"
            );
            None
        }
    }
}

fn run_job(executor: &'static str, job: Job) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
        let message = panic_payload_to_string(payload.as_ref())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        tracing::error!(
            target: "nbgradle.settings",
            executor,
            panic = %message,
            "settings task panicked"
        );
    }
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return Some((*message).to_string());
    }
    payload.downcast_ref::<String>().cloned()
}

/// Worker dispatching document-level changes of every [`crate::ProfileSettings`].
pub fn document_event_executor() -> &'static TaskExecutor {
    static EXECUTOR: OnceLock<TaskExecutor> = OnceLock::new();
    EXECUTOR.get_or_init(|| TaskExecutor::new("document-change-events"))
}

/// Worker delivering value-changed callbacks of properties.
pub fn event_executor() -> &'static TaskExecutor {
    static EXECUTOR: OnceLock<TaskExecutor> = OnceLock::new();
    EXECUTOR.get_or_init(|| TaskExecutor::new("settings-event-delivery"))
}

/// Waits until both settings workers ran out of work.
///
/// The workers feed each other (a commit on the document worker schedules callbacks on the event
/// worker and vice versa), so this keeps waiting until both are idle at the same time.
pub fn wait_for_settings_events(timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !document_event_executor().wait_for_pending(remaining) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !event_executor().wait_for_pending(remaining) {
            return false;
        }
        if document_event_executor().is_idle() && event_executor().is_idle() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
    }
}

/// Runs only the most recently submitted task.
///
/// Submitting while an earlier task is still queued replaces that task; superseded tasks are
/// dropped without running.
#[derive(Clone)]
pub(crate) struct UpdateTaskExecutor {
    executor: &'static TaskExecutor,
    slot: Arc<Mutex<Option<Job>>>,
}

impl UpdateTaskExecutor {
    pub(crate) fn new(executor: &'static TaskExecutor) -> Self {
        Self {
            executor,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn execute(&self, task: impl FnOnce() + Send + 'static) {
        let needs_drain = self.slot.lock().replace(Box::new(task)).is_none();
        if needs_drain {
            let slot = Arc::clone(&self.slot);
            self.executor.execute(move || {
                let task = slot.lock().take();
                if let Some(task) = task {
                    task();
                }
            });
        }
    }
}
