//! Single-worker scheduler

use std::collections::BinaryHeap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;

use super::{run_worker_task, CancellableTask, ScheduleError, Scheduler, Task, TimedTask};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

enum WorkerMessage {
  Run(CancellableTask),
  RunAt(Instant, CancellableTask),
  Shutdown,
}

/// Scheduler bound to one dedicated, named worker thread.
///
/// Calls originating on the worker thread itself execute inline; calls from
/// any other thread are queued to the worker in arrival order. Delayed
/// schedules are always queued, never inline, even from the worker thread.
///
/// Clones share the worker. The worker shuts down when the last handle is
/// dropped or [`shutdown`](ThreadScheduler::shutdown) is called; either way
/// queued work is drained first and pending timers are discarded.
#[derive(Clone)]
pub struct ThreadScheduler {
  core: Arc<ThreadCore>,
}

struct ThreadCore {
  sender: Mutex<Sender<WorkerMessage>>,
  worker_id: Arc<OnceCell<ThreadId>>,
  worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadScheduler {
  pub fn new() -> Self {
    Self::named("rxkit-worker")
  }

  pub fn named(name: &str) -> Self {
    let (sender, receiver) = mpsc::channel();
    let worker_id = Arc::new(OnceCell::new());

    let id_cell = Arc::clone(&worker_id);
    let worker = thread::Builder::new()
      .name(name.to_owned())
      .spawn(move || worker_loop(receiver, id_cell))
      .expect("failed to spawn scheduler worker thread");

    Self {
      core: Arc::new(ThreadCore {
        sender: Mutex::new(sender),
        worker_id,
        worker: Mutex::new(Some(worker)),
      }),
    }
  }

  /// Whether the calling thread is this scheduler's worker thread.
  pub fn is_worker_thread(&self) -> bool {
    self
      .core
      .worker_id
      .get()
      .is_some_and(|id| *id == thread::current().id())
  }

  /// Stop the worker after draining already-queued work. Pending delayed
  /// tasks are discarded. Idempotent.
  pub fn shutdown(&self) {
    let _ = self.core.post(WorkerMessage::Shutdown);
    if self.is_worker_thread() {
      return;
    }
    let worker = self.core.worker.lock().unwrap().take();
    if let Some(worker) = worker {
      let _ = worker.join();
    }
  }
}

impl Default for ThreadScheduler {
  fn default() -> Self {
    Self::new()
  }
}

impl ThreadCore {
  fn post(&self, message: WorkerMessage) -> Result<(), ScheduleError> {
    self
      .sender
      .lock()
      .unwrap()
      .send(message)
      .map_err(|_| ScheduleError::WorkerGone)
  }
}

impl Drop for ThreadCore {
  fn drop(&mut self) {
    let _ = self.post(WorkerMessage::Shutdown);
    let worker = self.worker.lock().unwrap().take();
    if let Some(worker) = worker {
      if worker.thread().id() != thread::current().id() {
        let _ = worker.join();
      }
    }
  }
}

impl Scheduler for ThreadScheduler {
  fn execute(&self, task: Task) {
    if self.is_worker_thread() {
      task();
      return;
    }
    let task = CancellableTask::new(task);
    if let Err(err) = self.core.post(WorkerMessage::Run(task)) {
      log::warn!("dropping task: {err}");
    }
  }

  fn schedule(&self, task: Task) -> BoxSubscription {
    if self.is_worker_thread() {
      task();
      return TeardownSubscription::closed().boxed();
    }
    let task = CancellableTask::new(task);
    match self.core.post(WorkerMessage::Run(task.clone())) {
      Ok(()) => task.boxed(),
      Err(err) => {
        log::warn!("dropping task: {err}");
        task.unsubscribe();
        TeardownSubscription::closed().boxed()
      }
    }
  }

  fn schedule_delayed(&self, delay: Duration, task: Task) -> BoxSubscription {
    let task = CancellableTask::new(task);
    let due = Instant::now() + delay;
    match self.core.post(WorkerMessage::RunAt(due, task.clone())) {
      Ok(()) => task.boxed(),
      Err(err) => {
        log::warn!("dropping delayed task: {err}");
        task.unsubscribe();
        TeardownSubscription::closed().boxed()
      }
    }
  }
}

fn worker_loop(receiver: Receiver<WorkerMessage>, worker_id: Arc<OnceCell<ThreadId>>) {
  let _ = worker_id.set(thread::current().id());
  log::debug!("scheduler worker started");

  let mut timers: BinaryHeap<TimedTask> = BinaryHeap::new();
  let mut seq: u64 = 0;

  loop {
    let now = Instant::now();
    while timers.peek().is_some_and(|timed| timed.due <= now) {
      if let Some(timed) = timers.pop() {
        run_worker_task(&timed.task);
      }
    }

    let message = match timers.peek() {
      None => match receiver.recv() {
        Ok(message) => message,
        Err(_) => break,
      },
      Some(next) => {
        let timeout = next.due.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(timeout) {
          Ok(message) => message,
          Err(RecvTimeoutError::Timeout) => continue,
          Err(RecvTimeoutError::Disconnected) => break,
        }
      }
    };

    match message {
      WorkerMessage::Run(task) => run_worker_task(&task),
      WorkerMessage::RunAt(due, task) => {
        timers.push(TimedTask { due, seq, task });
        seq += 1;
      }
      WorkerMessage::Shutdown => break,
    }
  }

  if !timers.is_empty() {
    log::debug!("scheduler worker stopping with {} pending timers", timers.len());
  } else {
    log::debug!("scheduler worker stopped");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scheduler::SchedulerExt;
  use std::sync::mpsc::channel;

  #[test]
  fn runs_queued_work_on_the_worker_thread() {
    let scheduler = ThreadScheduler::named("queued-work");
    let (sender, receiver) = channel();

    scheduler.execute_fn(move || {
      let _ = sender.send(thread::current().name().map(str::to_owned));
    });

    let name = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name.as_deref(), Some("queued-work"));
    scheduler.shutdown();
  }

  #[test]
  fn calls_from_worker_thread_run_inline() {
    let scheduler = ThreadScheduler::new();
    let (sender, receiver) = channel();

    let inner = scheduler.clone();
    scheduler.execute_fn(move || {
      // Runs on the worker; a nested execute must not deadlock and must be
      // synchronous.
      let order = Arc::new(Mutex::new(Vec::new()));
      let sink = order.clone();
      inner.execute_fn(move || sink.lock().unwrap().push("inline"));
      order.lock().unwrap().push("after");
      let _ = sender.send(order.lock().unwrap().clone());
    });

    let order = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(order, vec!["inline".to_owned(), "after".to_owned()]);
    scheduler.shutdown();
  }

  #[test]
  fn preserves_queue_order_for_cross_thread_calls() {
    let scheduler = ThreadScheduler::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (sender, receiver) = channel();

    for i in 0..10 {
      let sink = seen.clone();
      let done = sender.clone();
      scheduler.execute_fn(move || {
        sink.lock().unwrap().push(i);
        if i == 9 {
          let _ = done.send(());
        }
      });
    }

    receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    scheduler.shutdown();
  }

  #[test]
  fn delayed_task_fires_after_delay() {
    let scheduler = ThreadScheduler::new();
    let (sender, receiver) = channel();

    let started = Instant::now();
    scheduler.schedule_delayed_fn(Duration::from_millis(50), move || {
      let _ = sender.send(started.elapsed());
    });

    let elapsed = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(elapsed >= Duration::from_millis(50));
    scheduler.shutdown();
  }

  #[test]
  fn disposed_delayed_task_never_fires() {
    let scheduler = ThreadScheduler::new();
    let fired = Arc::new(Mutex::new(false));

    let flag = fired.clone();
    let pending = scheduler
      .schedule_delayed_fn(Duration::from_millis(50), move || *flag.lock().unwrap() = true);
    pending.unsubscribe();

    thread::sleep(Duration::from_millis(150));
    assert!(!*fired.lock().unwrap());
    scheduler.shutdown();
  }

  #[test]
  fn delayed_schedule_from_worker_is_queued_not_inline() {
    let scheduler = ThreadScheduler::new();
    let (sender, receiver) = channel();

    let inner = scheduler.clone();
    scheduler.execute_fn(move || {
      let (order_sender, order) = (sender, Arc::new(Mutex::new(Vec::new())));
      let sink = order.clone();
      let done = order_sender.clone();
      inner.schedule_delayed_fn(Duration::from_millis(10), move || {
        sink.lock().unwrap().push("timer");
        let _ = done.send(sink.lock().unwrap().clone());
      });
      order.lock().unwrap().push("caller");
    });

    let order = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(order, vec!["caller".to_owned(), "timer".to_owned()]);
    scheduler.shutdown();
  }
}
