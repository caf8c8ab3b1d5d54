//! Schedulers: where and when units of work execute
//!
//! The framework owns no threads of its own; concurrency is entirely
//! determined by which [`Scheduler`] a caller routes work through. Four
//! execution models are provided:
//!
//! - [`SyncScheduler`]: everything inline on the calling thread, which
//!   makes otherwise-asynchronous flows deterministic for testing.
//! - [`ThreadScheduler`]: one dedicated worker thread; calls originating on
//!   that thread run inline, everything else is queued.
//! - [`ThreadPoolScheduler`]: a pool of workers; every call is dispatched
//!   asynchronously regardless of the caller.
//! - [`LoopScheduler`]: bound to an [`EventLoop`] pumped by one embedding
//!   thread, the shape of a UI thread's message queue.
//!
//! All of them hand back subscriptions that, when disposed before the task
//! has run, prevent the task from running; pending timers included.

mod loop_scheduler;
mod sync;
mod thread_pool_scheduler;
mod thread_scheduler;

pub use loop_scheduler::{EventLoop, LoopScheduler};
pub use sync::SyncScheduler;
pub use thread_pool_scheduler::ThreadPoolScheduler;
pub use thread_scheduler::ThreadScheduler;

use std::cmp::Ordering as CmpOrdering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::subscription::{BoxSubscription, Subscription};

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Executes units of work now or after a delay.
///
/// Implementations keep no shared mutable state beyond their own execution
/// context, so any number of components may share one scheduler handle.
pub trait Scheduler: Send + Sync {
  /// Run `task` on this scheduler's execution context, with no handle to
  /// cancel it.
  fn execute(&self, task: Task);

  /// Run `task` on this scheduler's execution context. Disposing the
  /// returned subscription before the task has started prevents it from
  /// running.
  fn schedule(&self, task: Task) -> BoxSubscription;

  /// Run `task` after `delay`. The returned subscription cancels the pending
  /// timer.
  fn schedule_delayed(&self, delay: Duration, task: Task) -> BoxSubscription;
}

/// Shared scheduler handle, the form operators and components hold.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Closure-taking conveniences over [`Scheduler`]'s boxed-task surface.
pub trait SchedulerExt {
  fn execute_fn(&self, f: impl FnOnce() + Send + 'static);
  fn schedule_fn(&self, f: impl FnOnce() + Send + 'static) -> BoxSubscription;
  fn schedule_delayed_fn(
    &self,
    delay: Duration,
    f: impl FnOnce() + Send + 'static,
  ) -> BoxSubscription;
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {
  fn execute_fn(&self, f: impl FnOnce() + Send + 'static) {
    self.execute(Box::new(f));
  }

  fn schedule_fn(&self, f: impl FnOnce() + Send + 'static) -> BoxSubscription {
    self.schedule(Box::new(f))
  }

  fn schedule_delayed_fn(
    &self,
    delay: Duration,
    f: impl FnOnce() + Send + 'static,
  ) -> BoxSubscription {
    self.schedule_delayed(delay, Box::new(f))
  }
}

/// Failure to hand work to a scheduler's execution context.
#[derive(Debug, Error)]
pub enum ScheduleError {
  #[error("scheduler worker is no longer running")]
  WorkerGone,
  #[error("event loop has shut down")]
  LoopShutDown,
}

/// A task paired with its cancellation handle.
///
/// Queues hold these instead of raw closures: disposing the handle before
/// the queue gets around to the task drops the closure without running it,
/// while `run` consumes it at most once.
#[derive(Clone)]
pub struct CancellableTask {
  inner: Arc<CancellableTaskInner>,
}

struct CancellableTaskInner {
  cancelled: AtomicBool,
  task: Mutex<Option<Task>>,
}

impl CancellableTask {
  pub fn new(task: Task) -> Self {
    Self {
      inner: Arc::new(CancellableTaskInner {
        cancelled: AtomicBool::new(false),
        task: Mutex::new(Some(task)),
      }),
    }
  }

  /// Run the wrapped task unless it was cancelled or already ran.
  pub fn run(&self) {
    let task = self.inner.task.lock().unwrap().take();
    if let Some(task) = task {
      task();
    }
  }

  pub fn boxed(self) -> BoxSubscription {
    Box::new(self)
  }
}

impl Subscription for CancellableTask {
  fn unsubscribe(&self) {
    self.inner.cancelled.store(true, Ordering::Release);
    self.inner.task.lock().unwrap().take();
  }

  fn is_closed(&self) -> bool {
    self.inner.cancelled.load(Ordering::Acquire) || self.inner.task.lock().unwrap().is_none()
  }
}

/// Runs a queued task on a worker, keeping the worker alive if it panics.
/// The panic itself is the task owner's problem, matching the behaviour of
/// the executor services this models.
pub(crate) fn run_worker_task(task: &CancellableTask) {
  if panic::catch_unwind(AssertUnwindSafe(|| task.run())).is_err() {
    log::warn!("scheduled task panicked");
  }
}

/// Heap entry for delayed work, ordered soonest-first with FIFO tie-break.
pub(crate) struct TimedTask {
  pub(crate) due: Instant,
  pub(crate) seq: u64,
  pub(crate) task: CancellableTask,
}

impl PartialEq for TimedTask {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.seq == other.seq
  }
}

impl Eq for TimedTask {}

impl PartialOrd for TimedTask {
  fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
    Some(self.cmp(other))
  }
}

impl Ord for TimedTask {
  fn cmp(&self, other: &Self) -> CmpOrdering {
    // Reversed so that std's max-heap pops the earliest deadline.
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  #[test]
  fn cancellable_task_runs_once() {
    let count = Arc::new(Mutex::new(0));
    let counter = count.clone();
    let task = CancellableTask::new(Box::new(move || *counter.lock().unwrap() += 1));

    assert!(!task.is_closed());
    task.run();
    task.run();

    assert!(task.is_closed());
    assert_eq!(*count.lock().unwrap(), 1);
  }

  #[test]
  fn cancelled_task_never_runs() {
    let count = Arc::new(Mutex::new(0));
    let counter = count.clone();
    let task = CancellableTask::new(Box::new(move || *counter.lock().unwrap() += 1));

    task.unsubscribe();
    task.run();

    assert_eq!(*count.lock().unwrap(), 0);
    assert!(task.is_closed());
  }

  #[test]
  fn timed_tasks_order_soonest_first() {
    use std::collections::BinaryHeap;

    let now = Instant::now();
    let mut heap = BinaryHeap::new();
    for (seq, offset) in [(0u64, 30u64), (1, 10), (2, 20)] {
      heap.push(TimedTask {
        due: now + Duration::from_millis(offset),
        seq,
        task: CancellableTask::new(Box::new(|| {})),
      });
    }

    let order: Vec<u64> = std::iter::from_fn(|| heap.pop()).map(|t| t.seq).collect();
    assert_eq!(order, vec![1, 2, 0]);
  }
}
