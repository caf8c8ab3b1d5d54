//! Take operator

use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, Subscription, SubscriptionSlot, TeardownSubscription};

/// Forwards the first `count` emissions, then completes downstream and
/// detaches from the source without requiring an external dispose call.
pub struct Take<S> {
  source: S,
  count: usize,
}

impl<S> Take<S> {
  pub(crate) fn new(source: S, count: usize) -> Self {
    Self { source, count }
  }
}

impl<T, S> Observable<T> for Take<S>
where
  T: Send + 'static,
  S: Observable<T>,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    if self.count == 0 {
      observer.complete();
      return TeardownSubscription::closed().boxed();
    }

    let slot = SubscriptionSlot::new();
    let subscription = self.source.subscribe_observer(Arc::new(TakeObserver {
      downstream: observer,
      remaining: Mutex::new(self.count),
      slot: slot.clone(),
    }));
    slot.fill(subscription);
    slot.boxed()
  }
}

struct TakeObserver<T> {
  downstream: ObserverRef<T>,
  remaining: Mutex<usize>,
  slot: SubscriptionSlot,
}

impl<T: Send + 'static> Observer<T> for TakeObserver<T> {
  fn next(&self, value: T) {
    let is_last = {
      let mut remaining = self.remaining.lock().unwrap();
      if *remaining == 0 {
        return;
      }
      *remaining -= 1;
      *remaining == 0
    };
    self.downstream.next(value);
    if is_last {
      self.slot.unsubscribe();
      self.downstream.complete();
    }
  }

  fn complete(&self) {
    if *self.remaining.lock().unwrap() > 0 {
      self.downstream.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn forwards_only_the_first_n() {
    let subject = PublishSubject::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    subject
      .clone()
      .take(2)
      .subscribe(move |v| sink.lock().unwrap().push(v));

    subject.next(1);
    subject.next(2);
    subject.next(3);

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(subject.count(), 0);
  }

  #[test]
  fn completes_after_the_last_forwarded_value() {
    let completions = Arc::new(Mutex::new(0));
    let counter = completions.clone();
    from_iter(vec![1, 2, 3])
      .take(2)
      .subscribe_complete(|_| {}, move || *counter.lock().unwrap() += 1);
    assert_eq!(*completions.lock().unwrap(), 1);
  }

  #[test]
  fn zero_count_completes_without_subscribing() {
    let subject: PublishSubject<i32> = PublishSubject::new();
    let completions = Arc::new(Mutex::new(0));

    let counter = completions.clone();
    subject
      .clone()
      .take(0)
      .subscribe_complete(|_| panic!("no values expected"), move || {
        *counter.lock().unwrap() += 1
      });

    assert_eq!(subject.count(), 0);
    assert_eq!(*completions.lock().unwrap(), 1);
  }
}
