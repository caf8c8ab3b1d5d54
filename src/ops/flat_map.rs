//! Flat-map operator

use std::marker::PhantomData;
use std::sync::Arc;

use crate::observable::{Observable, ObservableRef};
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, CompositeSubscription};

/// Subscribes to the observable produced by the transform for each upstream
/// emission.
///
/// Inner sources are subscribed immediately, at the point the upstream
/// emission is received, and everything the active inner sources emit is
/// interleaved downstream in arrival order. All inner subscriptions are
/// tracked and disposed together with the outer one.
pub struct FlatMap<S, F, T> {
  source: S,
  transform: Arc<F>,
  _marker: PhantomData<fn(T)>,
}

impl<S, F, T> FlatMap<S, F, T> {
  pub(crate) fn new(source: S, transform: F) -> Self {
    Self {
      source,
      transform: Arc::new(transform),
      _marker: PhantomData,
    }
  }
}

impl<T, R, S, F> Observable<R> for FlatMap<S, F, T>
where
  T: Send + 'static,
  R: Send + 'static,
  S: Observable<T>,
  F: Fn(T) -> ObservableRef<R> + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<R>) -> BoxSubscription {
    let subscriptions = CompositeSubscription::new();

    let outer = self.source.subscribe_observer(Arc::new(FlatMapObserver {
      downstream: observer,
      transform: Arc::clone(&self.transform),
      subscriptions: subscriptions.clone(),
    }));
    subscriptions.add_boxed(outer);

    subscriptions.boxed()
  }
}

struct FlatMapObserver<F, R> {
  downstream: ObserverRef<R>,
  transform: Arc<F>,
  subscriptions: CompositeSubscription,
}

impl<T, R, F> Observer<T> for FlatMapObserver<F, R>
where
  T: Send + 'static,
  R: Send + 'static,
  F: Fn(T) -> ObservableRef<R> + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    let inner = (self.transform)(value);
    let subscription = inner.subscribe_observer(Arc::new(InnerObserver {
      downstream: self.downstream.clone(),
    }));
    self.subscriptions.add_boxed(subscription);
  }

  fn complete(&self) {
    self.downstream.complete();
  }
}

struct InnerObserver<R> {
  downstream: ObserverRef<R>,
}

impl<R: Send + 'static> Observer<R> for InnerObserver<R> {
  fn next(&self, value: R) {
    self.downstream.next(value);
  }

  // An inner source finishing does not finish the merged stream; only the
  // outer source's completion is forwarded.
  fn complete(&self) {}
}
