//! Cooperative event-loop scheduler

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use super::{run_worker_task, CancellableTask, ScheduleError, Scheduler, Task, TimedTask};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

enum LoopMessage {
  Run(CancellableTask),
  RunAt(Instant, CancellableTask),
  Shutdown,
}

/// A task queue pumped by exactly one embedding thread, in the shape of a
/// UI thread's message loop.
///
/// The embedder constructs the loop, hands [`LoopScheduler`] handles to
/// whatever needs them, and then either blocks in [`run`](EventLoop::run)
/// or interleaves [`turn`](EventLoop::turn) with its own work. The thread
/// currently pumping is the loop's bound thread: scheduler calls made from
/// it execute inline, calls from anywhere else are posted to the queue.
pub struct EventLoop {
  receiver: Receiver<LoopMessage>,
  timers: BinaryHeap<TimedTask>,
  seq: u64,
  shared: Arc<LoopShared>,
}

struct LoopShared {
  sender: Mutex<Sender<LoopMessage>>,
  pump_thread: Mutex<Option<ThreadId>>,
  shutdown: AtomicBool,
}

impl EventLoop {
  pub fn new() -> Self {
    let (sender, receiver) = mpsc::channel();
    Self {
      receiver,
      timers: BinaryHeap::new(),
      seq: 0,
      shared: Arc::new(LoopShared {
        sender: Mutex::new(sender),
        pump_thread: Mutex::new(None),
        shutdown: AtomicBool::new(false),
      }),
    }
  }

  /// A scheduler handle feeding this loop.
  pub fn scheduler(&self) -> LoopScheduler {
    LoopScheduler {
      shared: Arc::clone(&self.shared),
    }
  }

  /// Pump until [`LoopScheduler::shutdown`] is called.
  pub fn run(&mut self) {
    self.bind();
    log::debug!("event loop running");
    loop {
      self.fire_due_timers();

      let message = match self.timers.peek() {
        None => match self.receiver.recv() {
          Ok(message) => message,
          Err(_) => break,
        },
        Some(next) => {
          let timeout = next.due.saturating_duration_since(Instant::now());
          match self.receiver.recv_timeout(timeout) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
          }
        }
      };

      if self.dispatch(message) {
        break;
      }
    }
    log::debug!("event loop stopped");
  }

  /// Process everything that is ready right now (queued tasks and due
  /// timers) without blocking. Returns the number of tasks run.
  pub fn turn(&mut self) -> usize {
    self.bind();
    let mut ran = 0;

    loop {
      match self.receiver.try_recv() {
        Ok(LoopMessage::Run(task)) => {
          run_worker_task(&task);
          ran += 1;
        }
        Ok(message) => {
          if self.dispatch(message) {
            return ran;
          }
        }
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
      }
    }

    ran + self.fire_due_timers()
  }

  fn bind(&self) {
    *self.shared.pump_thread.lock().unwrap() = Some(thread::current().id());
  }

  /// Returns true when the loop should stop.
  fn dispatch(&mut self, message: LoopMessage) -> bool {
    match message {
      LoopMessage::Run(task) => {
        run_worker_task(&task);
        false
      }
      LoopMessage::RunAt(due, task) => {
        self.timers.push(TimedTask {
          due,
          seq: self.seq,
          task,
        });
        self.seq += 1;
        false
      }
      LoopMessage::Shutdown => true,
    }
  }

  fn fire_due_timers(&mut self) -> usize {
    let mut fired = 0;
    let now = Instant::now();
    while self.timers.peek().is_some_and(|timed| timed.due <= now) {
      if let Some(timed) = self.timers.pop() {
        run_worker_task(&timed.task);
        fired += 1;
      }
    }
    fired
  }
}

impl Default for EventLoop {
  fn default() -> Self {
    Self::new()
  }
}

/// Scheduler handle bound to an [`EventLoop`].
///
/// Calls from the loop's own pump thread execute inline; calls from any
/// other thread are posted to the back of the loop's queue. Delayed
/// schedules are always posted, never inline.
#[derive(Clone)]
pub struct LoopScheduler {
  shared: Arc<LoopShared>,
}

impl LoopScheduler {
  fn is_pump_thread(&self) -> bool {
    *self.shared.pump_thread.lock().unwrap() == Some(thread::current().id())
  }

  fn post(&self, message: LoopMessage) -> Result<(), ScheduleError> {
    if self.shared.shutdown.load(Ordering::Acquire) {
      return Err(ScheduleError::LoopShutDown);
    }
    self
      .shared
      .sender
      .lock()
      .unwrap()
      .send(message)
      .map_err(|_| ScheduleError::LoopShutDown)
  }

  /// Ask the loop to stop once it reaches this message. Idempotent.
  pub fn shutdown(&self) {
    let _ = self.post(LoopMessage::Shutdown);
    self.shared.shutdown.store(true, Ordering::Release);
  }
}

impl Scheduler for LoopScheduler {
  fn execute(&self, task: Task) {
    if self.is_pump_thread() {
      task();
      return;
    }
    if let Err(err) = self.post(LoopMessage::Run(CancellableTask::new(task))) {
      log::warn!("dropping task: {err}");
    }
  }

  fn schedule(&self, task: Task) -> BoxSubscription {
    if self.is_pump_thread() {
      task();
      return TeardownSubscription::closed().boxed();
    }
    let task = CancellableTask::new(task);
    match self.post(LoopMessage::Run(task.clone())) {
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
    match self.post(LoopMessage::RunAt(due, task.clone())) {
      Ok(()) => task.boxed(),
      Err(err) => {
        log::warn!("dropping delayed task: {err}");
        task.unsubscribe();
        TeardownSubscription::closed().boxed()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scheduler::SchedulerExt;
  use std::sync::mpsc::channel;

  #[test]
  fn posted_work_waits_for_the_pump() {
    let mut event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Bind the loop to this thread before posting from another one.
    event_loop.turn();

    let remote = scheduler.clone();
    let sink = seen.clone();
    let poster = thread::spawn(move || {
      remote.execute_fn(move || sink.lock().unwrap().push(1));
    });
    poster.join().unwrap();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(event_loop.turn(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![1]);
  }

  #[test]
  fn calls_from_the_pump_thread_run_inline() {
    let mut event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    event_loop.turn();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    scheduler.execute_fn(move || sink.lock().unwrap().push("inline"));

    assert_eq!(*seen.lock().unwrap(), vec!["inline"]);
  }

  #[test]
  fn delayed_work_is_posted_even_from_the_pump_thread() {
    let mut event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    event_loop.turn();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    scheduler.schedule_delayed_fn(Duration::from_millis(0), move || {
      sink.lock().unwrap().push("timer")
    });

    assert!(seen.lock().unwrap().is_empty());
    thread::sleep(Duration::from_millis(5));
    event_loop.turn();
    assert_eq!(*seen.lock().unwrap(), vec!["timer"]);
  }

  #[test]
  fn disposed_pending_task_is_skipped() {
    let mut event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    event_loop.turn();

    let fired = Arc::new(Mutex::new(false));
    let flag = fired.clone();

    let remote = scheduler.clone();
    let (sender, receiver) = channel();
    thread::spawn(move || {
      let pending = remote.schedule_fn(move || *flag.lock().unwrap() = true);
      pending.unsubscribe();
      let _ = sender.send(());
    })
    .join()
    .unwrap();
    receiver.recv_timeout(Duration::from_secs(1)).unwrap();

    event_loop.turn();
    assert!(!*fired.lock().unwrap());
  }

  #[test]
  fn run_stops_on_shutdown() {
    let mut event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let remote = scheduler.clone();
    let driver = thread::spawn(move || {
      remote.execute_fn(move || sink.lock().unwrap().push(1));
      remote.shutdown();
    });

    event_loop.run();
    driver.join().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1]);
  }
}
