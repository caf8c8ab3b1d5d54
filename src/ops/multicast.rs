//! Multicast wrapper backing `share` and `share_replay`

use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::observer::ObserverRef;
use crate::subject::{ReplaySubject, Subject};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

/// Turns a single-subscription source into a reference-counted fan-out hub.
///
/// The upstream is subscribed exactly once, when the first downstream
/// observer arrives; later observers reuse that subscription. When the
/// downstream count returns to zero the upstream subscription is disposed,
/// and a subsequent subscriber connects it again; the hub is not a
/// one-shot. The internal replay cache (capacity 0 for plain `share`)
/// survives reconnects.
pub struct Multicast<S, T> {
  inner: Arc<MulticastInner<S, T>>,
}

struct MulticastInner<S, T> {
  source: S,
  hub: ReplaySubject<T>,
  upstream: Mutex<Option<BoxSubscription>>,
}

impl<S, T> Multicast<S, T> {
  pub(crate) fn new(source: S, replay: isize) -> Self {
    Self {
      inner: Arc::new(MulticastInner {
        source,
        hub: ReplaySubject::new(replay),
        upstream: Mutex::new(None),
      }),
    }
  }
}

impl<S, T> Clone for Multicast<S, T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T, S> Observable<T> for Multicast<S, T>
where
  T: Clone + Send + 'static,
  S: Observable<T> + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let downstream = self.inner.hub.subscribe_observer(observer);

    {
      let mut upstream = self.inner.upstream.lock().unwrap();
      if upstream.is_none() {
        log::trace!("multicast connecting to upstream");
        let hub: ObserverRef<T> = Arc::new(self.inner.hub.clone());
        *upstream = Some(self.inner.source.subscribe_observer(hub));
      }
    }

    let inner = Arc::clone(&self.inner);
    TeardownSubscription::new(move || {
      downstream.unsubscribe();
      let disconnect = {
        let mut upstream = inner.upstream.lock().unwrap();
        if inner.hub.count() == 0 {
          upstream.take()
        } else {
          None
        }
      };
      if let Some(disconnect) = disconnect {
        log::trace!("multicast disconnecting from upstream");
        disconnect.unsubscribe();
      }
    })
    .boxed()
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn upstream_is_subscribed_once_for_many_observers() {
    let source = PublishSubject::new();
    let shared = source.clone().share();

    assert_eq!(source.count(), 0);

    let first = shared.subscribe(|_: i32| {});
    let second = shared.subscribe(|_: i32| {});
    assert_eq!(source.count(), 1);

    first.unsubscribe();
    assert_eq!(source.count(), 1);

    second.unsubscribe();
    assert_eq!(source.count(), 0);
  }

  #[test]
  fn emissions_reach_every_downstream_observer() {
    let source = PublishSubject::new();
    let shared = source.clone().share();
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));

    let sink = first.clone();
    shared.subscribe(move |v| sink.lock().unwrap().push(v));
    let sink = second.clone();
    shared.subscribe(move |v| sink.lock().unwrap().push(v));

    source.next(1);

    assert_eq!(*first.lock().unwrap(), vec![1]);
    assert_eq!(*second.lock().unwrap(), vec![1]);
  }

  #[test]
  fn share_does_not_replay_to_late_observers() {
    let source = PublishSubject::new();
    let shared = source.clone().share();
    let early = Arc::new(Mutex::new(Vec::new()));
    let late = Arc::new(Mutex::new(Vec::new()));

    let sink = early.clone();
    shared.subscribe(move |v| sink.lock().unwrap().push(v));
    source.next(1);

    let sink = late.clone();
    shared.subscribe(move |v| sink.lock().unwrap().push(v));
    source.next(2);

    assert_eq!(*early.lock().unwrap(), vec![1, 2]);
    assert_eq!(*late.lock().unwrap(), vec![2]);
  }

  #[test]
  fn share_replay_caches_the_last_n_for_late_observers() {
    let source = PublishSubject::new();
    let shared = source.clone().share_replay(1);

    shared.subscribe(|_: i32| {});
    source.next(1);
    source.next(2);

    let late = Arc::new(Mutex::new(Vec::new()));
    let sink = late.clone();
    shared.subscribe(move |v| sink.lock().unwrap().push(v));

    assert_eq!(*late.lock().unwrap(), vec![2]);
  }

  #[test]
  fn reconnects_for_a_subscriber_after_the_count_hits_zero() {
    let connects = Arc::new(Mutex::new(0));
    let hot = PublishSubject::new();

    let counter = connects.clone();
    let upstream = hot.clone();
    let shared = create(move |observer: ObserverRef<i32>| {
      *counter.lock().unwrap() += 1;
      upstream.subscribe_observer(observer)
    })
    .share();

    let first = shared.subscribe(|_| {});
    assert_eq!(*connects.lock().unwrap(), 1);
    first.unsubscribe();
    assert_eq!(hot.count(), 0);

    let second = shared.subscribe(|_| {});
    assert_eq!(*connects.lock().unwrap(), 2);
    assert_eq!(hot.count(), 1);
    second.unsubscribe();
  }
}
