//! Resubscribing operator

use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, Subscription, SubscriptionSlot};

/// Re-subscribes to the source each time a subscription cycle completes, for
/// as long as the predicate returns true.
///
/// Meant for sources whose production logic re-runs from scratch on every
/// subscribe; the predicate decides whether another run is wanted. Sources
/// that complete synchronously are driven in a loop rather than by
/// recursion, so arbitrarily many back-to-back cycles are safe.
pub struct Resubscribing<S, P> {
  source: Arc<S>,
  predicate: Arc<P>,
}

impl<S, P> Resubscribing<S, P> {
  pub(crate) fn new(source: S, predicate: P) -> Self {
    Self {
      source: Arc::new(source),
      predicate: Arc::new(predicate),
    }
  }
}

impl<T, S, P> Observable<T> for Resubscribing<S, P>
where
  T: Send + 'static,
  S: Observable<T> + 'static,
  P: Fn() -> bool + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let state = Arc::new(CycleState {
      slot: SubscriptionSlot::new(),
      flags: Mutex::new(CycleFlags {
        driving: false,
        pending: false,
      }),
    });

    drive_cycles(
      Arc::clone(&self.source),
      Arc::clone(&self.predicate),
      observer,
      Arc::clone(&state),
    );

    state.slot.clone().boxed()
  }
}

struct CycleState {
  slot: SubscriptionSlot,
  flags: Mutex<CycleFlags>,
}

struct CycleFlags {
  /// A subscribe loop is running somewhere on the stack.
  driving: bool,
  /// A cycle completed while the loop was still subscribing; run another.
  pending: bool,
}

/// Subscribe repeatedly until a cycle stays live past its subscribe call.
///
/// A synchronously-completing source flags `pending` from inside
/// `subscribe_observer`; the loop picks that up and starts the next cycle
/// iteratively.
fn drive_cycles<T, S, P>(
  source: Arc<S>,
  predicate: Arc<P>,
  downstream: ObserverRef<T>,
  state: Arc<CycleState>,
) where
  T: Send + 'static,
  S: Observable<T> + 'static,
  P: Fn() -> bool + Send + Sync + 'static,
{
  {
    let mut flags = state.flags.lock().unwrap();
    flags.driving = true;
    flags.pending = false;
  }

  loop {
    if state.slot.is_closed() {
      return;
    }

    let observer: ObserverRef<T> = Arc::new(CycleObserver {
      source: Arc::clone(&source),
      predicate: Arc::clone(&predicate),
      downstream: downstream.clone(),
      state: Arc::clone(&state),
    });
    let subscription = source.subscribe_observer(observer);

    let mut flags = state.flags.lock().unwrap();
    if flags.pending {
      flags.pending = false;
      drop(flags);
      subscription.unsubscribe();
      continue;
    }
    flags.driving = false;
    drop(flags);
    state.slot.fill(subscription);
    return;
  }
}

struct CycleObserver<S, P, T> {
  source: Arc<S>,
  predicate: Arc<P>,
  downstream: ObserverRef<T>,
  state: Arc<CycleState>,
}

impl<T, S, P> Observer<T> for CycleObserver<S, P, T>
where
  T: Send + 'static,
  S: Observable<T> + 'static,
  P: Fn() -> bool + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    self.downstream.next(value);
  }

  fn complete(&self) {
    if self.state.slot.is_closed() {
      return;
    }
    if !(self.predicate)() {
      self.downstream.complete();
      return;
    }

    {
      let mut flags = self.state.flags.lock().unwrap();
      if flags.driving {
        flags.pending = true;
        return;
      }
    }
    drive_cycles(
      Arc::clone(&self.source),
      Arc::clone(&self.predicate),
      self.downstream.clone(),
      Arc::clone(&self.state),
    );
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn resubscribes_until_the_predicate_fails() {
    let cycles = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let counter = cycles.clone();
    let source = create(move |observer: ObserverRef<usize>| {
      let cycle = counter.fetch_add(1, Ordering::SeqCst);
      observer.next(cycle);
      observer.complete();
      TeardownSubscription::closed().boxed()
    });

    let limit = cycles.clone();
    let sink = seen.clone();
    source
      .resubscribing_while(move || limit.load(Ordering::SeqCst) < 3)
      .subscribe(move |v| sink.lock().unwrap().push(v));

    assert_eq!(cycles.load(Ordering::SeqCst), 3);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn first_cycle_always_runs_and_completion_is_forwarded() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let completions = Arc::new(Mutex::new(0));

    let sink = seen.clone();
    let counter = completions.clone();
    from_iter(vec![1])
      .resubscribing_while(|| false)
      .subscribe_complete(
        move |v| sink.lock().unwrap().push(v),
        move || *counter.lock().unwrap() += 1,
      );

    assert_eq!(*seen.lock().unwrap(), vec![1]);
    assert_eq!(*completions.lock().unwrap(), 1);
  }

  #[test]
  fn asynchronous_cycles_resubscribe_on_completion() {
    let subject = PublishSubject::new();
    let attach_count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let counter = attach_count.clone();
    let upstream = subject.clone();
    let source = create(move |observer: ObserverRef<i32>| {
      counter.fetch_add(1, Ordering::SeqCst);
      upstream.subscribe_observer(observer)
    });

    let sink = seen.clone();
    let done = Arc::new(AtomicUsize::new(0));
    let gate = done.clone();
    let subscription = source
      .resubscribing_while(move || gate.load(Ordering::SeqCst) < 2)
      .subscribe(move |v| sink.lock().unwrap().push(v));

    assert_eq!(attach_count.load(Ordering::SeqCst), 1);

    subject.next(1);
    done.fetch_add(1, Ordering::SeqCst);
    subject.complete();
    // The cycle ended while the predicate still held, so a fresh
    // subscription replaced the finished one.
    assert_eq!(attach_count.load(Ordering::SeqCst), 2);

    subject.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

    subscription.unsubscribe();
    assert_eq!(subject.count(), 0);
  }
}
