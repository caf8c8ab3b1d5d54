//! Inline scheduler

use std::time::Duration;

use super::{Scheduler, Task};
use crate::subscription::{BoxSubscription, TeardownSubscription};

/// Runs every unit of work inline on the calling thread, immediately,
/// delayed schedules included. Makes otherwise-asynchronous flows
/// deterministic, which is what the test suites of the consuming components
/// rely on.
#[derive(Clone, Copy, Default)]
pub struct SyncScheduler;

impl Scheduler for SyncScheduler {
  fn execute(&self, task: Task) {
    task();
  }

  fn schedule(&self, task: Task) -> BoxSubscription {
    task();
    TeardownSubscription::closed().boxed()
  }

  fn schedule_delayed(&self, _delay: Duration, task: Task) -> BoxSubscription {
    self.schedule(task)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scheduler::SchedulerExt;
  use crate::subscription::Subscription;
  use std::sync::{Arc, Mutex};

  #[test]
  fn runs_inline_including_delays() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let scheduler = SyncScheduler;

    let sink = order.clone();
    scheduler.execute_fn(move || sink.lock().unwrap().push("execute"));
    let sink = order.clone();
    let first = scheduler.schedule_fn(move || sink.lock().unwrap().push("schedule"));
    let sink = order.clone();
    let second =
      scheduler.schedule_delayed_fn(Duration::from_secs(60), move || {
        sink.lock().unwrap().push("delayed")
      });

    assert_eq!(*order.lock().unwrap(), vec!["execute", "schedule", "delayed"]);
    assert!(first.is_closed());
    assert!(second.is_closed());
  }
}
