//! Flat-map-latest (switch) operator

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::observable::{Observable, ObservableRef};
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

/// Switch semantics: each upstream emission disposes the previous inner
/// subscription before the transform's new observable is subscribed, so only
/// the most recently produced inner source reaches downstream.
///
/// Upstream emissions raised re-entrantly from inside the transform itself
/// are conflated: intermediate values are discarded and the transform runs
/// exactly once more, for the final pending value.
pub struct FlatMapLatest<S, F, T> {
  source: S,
  transform: Arc<F>,
  _marker: PhantomData<fn(T)>,
}

impl<S, F, T> FlatMapLatest<S, F, T> {
  pub(crate) fn new(source: S, transform: F) -> Self {
    Self {
      source,
      transform: Arc::new(transform),
      _marker: PhantomData,
    }
  }
}

impl<T, R, S, F> Observable<R> for FlatMapLatest<S, F, T>
where
  T: Send + 'static,
  R: Send + 'static,
  S: Observable<T>,
  F: Fn(T) -> ObservableRef<R> + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<R>) -> BoxSubscription {
    let state = Arc::new(SwitchState {
      inner: Mutex::new(SwitchInner {
        busy: false,
        pending: None,
        active: None,
        closed: false,
      }),
    });

    let outer = self.source.subscribe_observer(Arc::new(SwitchObserver {
      downstream: observer,
      transform: Arc::clone(&self.transform),
      state: Arc::clone(&state),
    }));

    TeardownSubscription::new(move || {
      outer.unsubscribe();
      let active = {
        let mut inner = state.inner.lock().unwrap();
        inner.closed = true;
        inner.pending = None;
        inner.active.take()
      };
      if let Some(active) = active {
        active.unsubscribe();
      }
    })
    .boxed()
  }
}

struct SwitchState<T> {
  inner: Mutex<SwitchInner<T>>,
}

struct SwitchInner<T> {
  /// A switch is in progress on some call stack; re-entrant upstream
  /// emissions park their value in `pending` instead of recursing.
  busy: bool,
  pending: Option<T>,
  active: Option<BoxSubscription>,
  closed: bool,
}

struct SwitchObserver<F, T, R> {
  downstream: ObserverRef<R>,
  transform: Arc<F>,
  state: Arc<SwitchState<T>>,
}

impl<T, R, F> Observer<T> for SwitchObserver<F, T, R>
where
  T: Send + 'static,
  R: Send + 'static,
  F: Fn(T) -> ObservableRef<R> + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    {
      let mut inner = self.state.inner.lock().unwrap();
      if inner.closed {
        return;
      }
      if inner.busy {
        inner.pending = Some(value);
        return;
      }
      inner.busy = true;
    }

    let mut value = value;
    loop {
      let previous = self.state.inner.lock().unwrap().active.take();
      if let Some(previous) = previous {
        previous.unsubscribe();
      }

      // Both the transform and the subscribe call may re-enter `next`;
      // anything they emit upstream lands in `pending`.
      let inner_source = (self.transform)(value);
      let subscription = inner_source.subscribe_observer(Arc::new(LatestObserver {
        downstream: self.downstream.clone(),
      }));

      let mut inner = self.state.inner.lock().unwrap();
      if inner.closed {
        drop(inner);
        subscription.unsubscribe();
        return;
      }
      match inner.pending.take() {
        Some(newer) => {
          inner.active = Some(subscription);
          drop(inner);
          value = newer;
        }
        None => {
          inner.active = Some(subscription);
          inner.busy = false;
          return;
        }
      }
    }
  }

  fn complete(&self) {
    self.downstream.complete();
  }
}

struct LatestObserver<R> {
  downstream: ObserverRef<R>,
}

impl<R: Send + 'static> Observer<R> for LatestObserver<R> {
  fn next(&self, value: R) {
    self.downstream.next(value);
  }

  fn complete(&self) {}
}
