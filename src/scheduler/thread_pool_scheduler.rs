//! Pool-backed scheduler

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{run_worker_task, CancellableTask, ScheduleError, Scheduler, SchedulerExt, Task, ThreadScheduler};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

/// Scheduler backed by a pool of worker threads.
///
/// Every call is dispatched asynchronously, regardless of which thread it
/// originates on, including calls made from one of the pool's own workers.
/// Delayed work is sequenced on an internal timer and joins the regular
/// queue when due.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  core: Arc<PoolCore>,
}

struct PoolCore {
  queue: Arc<PoolQueue>,
  timer: ThreadScheduler,
  workers: Mutex<Vec<JoinHandle<()>>>,
}

struct PoolQueue {
  state: Mutex<PoolState>,
  available: Condvar,
}

struct PoolState {
  tasks: VecDeque<CancellableTask>,
  shutdown: bool,
}

impl ThreadPoolScheduler {
  pub fn new(threads: usize) -> Self {
    Self::named("rxkit-pool", threads)
  }

  pub fn named(name: &str, threads: usize) -> Self {
    let queue = Arc::new(PoolQueue {
      state: Mutex::new(PoolState {
        tasks: VecDeque::new(),
        shutdown: false,
      }),
      available: Condvar::new(),
    });

    let workers = (0..threads.max(1))
      .map(|index| {
        let queue = Arc::clone(&queue);
        thread::Builder::new()
          .name(format!("{name}-{index}"))
          .spawn(move || worker_loop(queue))
          .expect("failed to spawn pool worker thread")
      })
      .collect();

    log::debug!("thread pool started with {} workers", threads.max(1));

    Self {
      core: Arc::new(PoolCore {
        queue,
        timer: ThreadScheduler::named(&format!("{name}-timer")),
        workers: Mutex::new(workers),
      }),
    }
  }

  /// Stop the workers after the queue drains. Pending delayed tasks are
  /// discarded. Idempotent.
  pub fn shutdown(&self) {
    self.core.timer.shutdown();
    self.core.queue.close();
    let workers = std::mem::take(&mut *self.core.workers.lock().unwrap());
    let current = thread::current().id();
    for worker in workers {
      if worker.thread().id() != current {
        let _ = worker.join();
      }
    }
  }

  fn submit(&self, task: CancellableTask) -> BoxSubscription {
    match self.core.queue.push(task.clone()) {
      Ok(()) => task.boxed(),
      Err(err) => {
        log::warn!("dropping task: {err}");
        task.unsubscribe();
        TeardownSubscription::closed().boxed()
      }
    }
  }
}

impl PoolQueue {
  fn push(&self, task: CancellableTask) -> Result<(), ScheduleError> {
    let mut state = self.state.lock().unwrap();
    if state.shutdown {
      return Err(ScheduleError::WorkerGone);
    }
    state.tasks.push_back(task);
    drop(state);
    self.available.notify_one();
    Ok(())
  }

  fn close(&self) {
    self.state.lock().unwrap().shutdown = true;
    self.available.notify_all();
  }
}

impl Drop for PoolCore {
  fn drop(&mut self) {
    self.queue.close();
    let workers = std::mem::take(&mut *self.workers.lock().unwrap());
    let current = thread::current().id();
    for worker in workers {
      if worker.thread().id() != current {
        let _ = worker.join();
      }
    }
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn execute(&self, task: Task) {
    self.submit(CancellableTask::new(task));
  }

  fn schedule(&self, task: Task) -> BoxSubscription {
    self.submit(CancellableTask::new(task))
  }

  fn schedule_delayed(&self, delay: Duration, task: Task) -> BoxSubscription {
    let task = CancellableTask::new(task);
    let queue = Arc::clone(&self.core.queue);
    let pending = task.clone();
    self.core.timer.schedule_delayed_fn(delay, move || {
      if pending.is_closed() {
        return;
      }
      if let Err(err) = queue.push(pending) {
        log::warn!("dropping delayed task: {err}");
      }
    });
    task.boxed()
  }
}

fn worker_loop(queue: Arc<PoolQueue>) {
  loop {
    let task = {
      let mut state = queue.state.lock().unwrap();
      loop {
        if let Some(task) = state.tasks.pop_front() {
          break Some(task);
        }
        if state.shutdown {
          break None;
        }
        state = queue.available.wait(state).unwrap();
      }
    };
    match task {
      Some(task) => run_worker_task(&task),
      None => break,
    }
  }
}
