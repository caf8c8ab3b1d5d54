//! Observe-on operator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::scheduler::{SchedulerExt, SchedulerRef};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

/// Redirects every delivery through a scheduler.
///
/// Subscribing still happens synchronously on the caller's thread; only the
/// emissions (and the completion signal) hop onto the scheduler's execution
/// context, so the downstream observer never runs on the source's thread.
pub struct ObserveOn<S> {
  source: S,
  scheduler: SchedulerRef,
}

impl<S> ObserveOn<S> {
  pub(crate) fn new(source: S, scheduler: SchedulerRef) -> Self {
    Self { source, scheduler }
  }
}

impl<T, S> Observable<T> for ObserveOn<S>
where
  T: Send + 'static,
  S: Observable<T>,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let closed = Arc::new(AtomicBool::new(false));
    let subscription = self.source.subscribe_observer(Arc::new(ObserveOnObserver {
      downstream: observer,
      scheduler: Arc::clone(&self.scheduler),
      closed: Arc::clone(&closed),
    }));

    TeardownSubscription::new(move || {
      closed.store(true, Ordering::Release);
      subscription.unsubscribe();
    })
    .boxed()
  }
}

struct ObserveOnObserver<T> {
  downstream: ObserverRef<T>,
  scheduler: SchedulerRef,
  closed: Arc<AtomicBool>,
}

impl<T: Send + 'static> Observer<T> for ObserveOnObserver<T> {
  fn next(&self, value: T) {
    if self.closed.load(Ordering::Acquire) {
      return;
    }
    let downstream = self.downstream.clone();
    let closed = Arc::clone(&self.closed);
    self.scheduler.execute_fn(move || {
      if !closed.load(Ordering::Acquire) {
        downstream.next(value);
      }
    });
  }

  fn complete(&self) {
    if self.closed.load(Ordering::Acquire) {
      return;
    }
    let downstream = self.downstream.clone();
    let closed = Arc::clone(&self.closed);
    self.scheduler.execute_fn(move || {
      if !closed.load(Ordering::Acquire) {
        downstream.complete();
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::mpsc::channel;
  use std::sync::{Arc, Mutex};
  use std::thread;
  use std::time::Duration;

  #[test]
  fn deliveries_wait_for_the_loop_pump() {
    let mut event_loop = EventLoop::new();
    let scheduler: SchedulerRef = Arc::new(event_loop.scheduler());
    let subject = PublishSubject::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    subject
      .clone()
      .observe_on(scheduler)
      .subscribe(move |v| sink.lock().unwrap().push(v));

    subject.next(1);
    subject.next(2);
    assert!(seen.lock().unwrap().is_empty());

    event_loop.turn();
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn deliveries_run_on_the_scheduler_thread() {
    let scheduler = ThreadScheduler::named("observe-on");
    let subject = PublishSubject::new();
    let (sender, receiver) = channel();

    subject
      .clone()
      .observe_on(Arc::new(scheduler.clone()))
      .subscribe(move |v: i32| {
        let _ = sender.send((v, thread::current().name().map(str::to_owned)));
      });

    subject.next(7);
    let (value, name) = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(value, 7);
    assert_eq!(name.as_deref(), Some("observe-on"));
    scheduler.shutdown();
  }

  #[test]
  fn disposal_stops_pending_deliveries() {
    let mut event_loop = EventLoop::new();
    let scheduler: SchedulerRef = Arc::new(event_loop.scheduler());
    let subject = PublishSubject::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    event_loop.turn();

    let sink = seen.clone();
    let subscription = subject
      .clone()
      .observe_on(scheduler)
      .subscribe(move |v| sink.lock().unwrap().push(v));

    // Queued behind the loop, then disposed before the pump runs. The
    // publish happens off the pump thread so delivery cannot be inline.
    let publisher = subject.clone();
    thread::spawn(move || publisher.next(1)).join().unwrap();
    subscription.unsubscribe();

    event_loop.turn();
    assert!(seen.lock().unwrap().is_empty());
  }
}
