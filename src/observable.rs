//! Observable trait, the operator extension surface, and source factories
//!
//! An [`Observable`] is a source that can be subscribed to, yielding a
//! cancellable [`BoxSubscription`]. Cold sources re-run their production
//! logic on every subscribe; hot sources are backed by a subject.
//!
//! Subscribing takes `&self`, so sources stay usable after a subscription
//! ends. This is what lets the multicast wrapper reconnect after its
//! downstream count drops to zero and [`ObservableExt::resubscribing_while`]
//! start a fresh cycle whenever one completes.

mod create;
mod from_iter;
mod of;
mod trivial;

pub use create::{callback, create, Callback, Create};
pub use from_iter::{from_iter, FromIter};
pub use of::{of, Of};
pub use trivial::{empty, Empty};

use std::sync::Arc;

use crate::observer::{ClosureObserver, ObserverRef};
use crate::ops::{
  Buffered, Combine, DistinctUntilChanged, Filter, FilterMap, FlatMap, FlatMapLatest, Map,
  Multicast, ObserveOn, Resubscribing, StartWith, SubscribeOn, Take, TakeWhile, Tap, WithState,
};
use crate::scheduler::SchedulerRef;
use crate::subscription::BoxSubscription;

/// A source of pushed values.
pub trait Observable<T>: Send + Sync {
  /// Attach `observer` to this source. The returned subscription detaches it
  /// again; for cold sources it also stops the production logic.
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription;
}

/// Shared, type-erased observable handle.
pub type ObservableRef<T> = Arc<dyn Observable<T>>;

impl<T, O> Observable<T> for Arc<O>
where
  O: Observable<T> + ?Sized,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    (**self).subscribe_observer(observer)
  }
}

/// An observable that additionally holds a current value.
///
/// This is the read-only "state view" other components are handed for things
/// like settings propagation: read `value` now, subscribe for what comes
/// next.
pub trait ObservableState<T>: Observable<T> {
  fn value(&self) -> T;
}

impl<T, O> ObservableState<T> for Arc<O>
where
  O: ObservableState<T> + ?Sized,
{
  fn value(&self) -> T {
    (**self).value()
  }
}

/// Combinators available on every observable.
pub trait ObservableExt<T: Send + 'static>: Observable<T> + Sized {
  /// Subscribe with a plain closure for `next`.
  fn subscribe(&self, on_next: impl Fn(T) + Send + Sync + 'static) -> BoxSubscription {
    self.subscribe_observer(Arc::new(ClosureObserver::next_only(on_next)))
  }

  /// Subscribe with closures for both `next` and `complete`.
  fn subscribe_complete(
    &self,
    on_next: impl Fn(T) + Send + Sync + 'static,
    on_complete: impl Fn() + Send + Sync + 'static,
  ) -> BoxSubscription {
    self.subscribe_observer(Arc::new(ClosureObserver::new(on_next, on_complete)))
  }

  /// Transform every emission with `transform`.
  fn map<R, F>(self, transform: F) -> Map<Self, F, T>
  where
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
  {
    Map::new(self, transform)
  }

  /// Drop emissions for which `predicate` returns false.
  fn filter<F>(self, predicate: F) -> Filter<Self, F>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    Filter::new(self, predicate)
  }

  /// Transform emissions, keeping only the `Some` results.
  fn filter_map<R, F>(self, transform: F) -> FilterMap<Self, F, T>
  where
    R: Send + 'static,
    F: Fn(T) -> Option<R> + Send + Sync + 'static,
  {
    FilterMap::new(self, transform)
  }

  /// Run `callback` for every emission, then forward the original value.
  fn tap<F>(self, callback: F) -> Tap<Self, F>
  where
    F: Fn(&T) + Send + Sync + 'static,
  {
    Tap::new(self, callback)
  }

  /// Subscribe to the observable produced by `transform` for each upstream
  /// emission and interleave everything the active inner sources emit.
  fn flat_map<R, F>(self, transform: F) -> FlatMap<Self, F, T>
  where
    R: Send + 'static,
    F: Fn(T) -> ObservableRef<R> + Send + Sync + 'static,
  {
    FlatMap::new(self, transform)
  }

  /// Like [`flat_map`](Self::flat_map), but each upstream emission disposes
  /// the previous inner subscription before the next one is made, so only
  /// the latest inner source reaches downstream.
  fn flat_map_latest<R, F>(self, transform: F) -> FlatMapLatest<Self, F, T>
  where
    R: Send + 'static,
    F: Fn(T) -> ObservableRef<R> + Send + Sync + 'static,
  {
    FlatMapLatest::new(self, transform)
  }

  /// Withhold the first `count` emissions, then flush them all downstream in
  /// arrival order once the `count`-th arrives.
  fn buffered(self, count: usize) -> Buffered<Self> {
    Buffered::new(self, count)
  }

  /// Forward only the first `count` emissions, then complete and detach.
  fn take(self, count: usize) -> Take<Self> {
    Take::new(self, count)
  }

  /// Forward emissions while `predicate` holds; the first failing value is
  /// dropped and the subscription tears itself down.
  fn take_while<F>(self, predicate: F) -> TakeWhile<Self, F>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    TakeWhile::new(self, predicate, false)
  }

  /// Like [`take_while`](Self::take_while), but the first failing value is
  /// forwarded once before the subscription tears itself down.
  fn take_while_inclusive<F>(self, predicate: F) -> TakeWhile<Self, F>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    TakeWhile::new(self, predicate, true)
  }

  /// Suppress emissions equal to their immediate predecessor.
  fn distinct_until_changed(self) -> DistinctUntilChanged<Self, fn(&T, &T) -> bool>
  where
    T: PartialEq,
  {
    DistinctUntilChanged::new(self, T::eq as fn(&T, &T) -> bool)
  }

  /// Suppress emissions considered equal to their predecessor by `eq`.
  fn distinct_until_changed_by<F>(self, eq: F) -> DistinctUntilChanged<Self, F>
  where
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
  {
    DistinctUntilChanged::new(self, eq)
  }

  /// Emit `items` to each new subscriber before subscribing the source.
  fn start_with(self, items: Vec<T>) -> StartWith<Self, T>
  where
    T: Clone,
  {
    StartWith::new(self, items)
  }

  /// Deliver every emission through `scheduler`, leaving the subscribe call
  /// itself on the caller's thread.
  fn observe_on(self, scheduler: SchedulerRef) -> ObserveOn<Self> {
    ObserveOn::new(self, scheduler)
  }

  /// Perform the (possibly costly) subscribe call on `scheduler`. Emissions
  /// still arrive on whatever thread the source naturally emits from.
  fn subscribe_on(self, scheduler: SchedulerRef) -> SubscribeOn<Self> {
    SubscribeOn::new(self, scheduler)
  }

  /// Share one upstream subscription between all downstream observers, with
  /// no replay for late subscribers.
  fn share(self) -> Multicast<Self, T>
  where
    Self: 'static,
    T: Clone,
  {
    Multicast::new(self, 0)
  }

  /// Share one upstream subscription, replaying the last `replay` emissions
  /// to late subscribers. Negative capacities retain everything.
  fn share_replay(self, replay: isize) -> Multicast<Self, T>
  where
    Self: 'static,
    T: Clone,
  {
    Multicast::new(self, replay)
  }

  /// Attach a current-value view backed by `provider` without the source
  /// itself holding state; `provider` is only invoked when the value is
  /// read, never at subscribe time.
  fn with_state<F>(self, provider: F) -> WithState<Self, F>
  where
    F: Fn() -> T + Send + Sync + 'static,
  {
    WithState::new(self, provider)
  }

  /// Re-subscribe to the source whenever a subscription cycle completes, for
  /// as long as `predicate` returns true.
  fn resubscribing_while<P>(self, predicate: P) -> Resubscribing<Self, P>
  where
    Self: 'static,
    P: Fn() -> bool + Send + Sync + 'static,
  {
    Resubscribing::new(self, predicate)
  }

  /// Erase the concrete operator chain behind a shared handle.
  fn box_it(self) -> ObservableRef<T>
  where
    Self: 'static,
  {
    Arc::new(self)
  }
}

impl<T: Send + 'static, O: Observable<T>> ObservableExt<T> for O {}

/// N-ary combine-latest over a list of same-typed sources.
///
/// Nothing is emitted until every source has produced at least one value;
/// afterwards each single-source emission re-invokes `combiner` with the
/// current latest value of every source, in the order the sources were
/// given. An empty source list immediately emits `combiner(&[])` and
/// completes.
pub fn combine<T, R, S, F>(sources: Vec<S>, combiner: F) -> Combine<S, F, T>
where
  T: Clone + Send + 'static,
  R: Send + 'static,
  S: Observable<T>,
  F: Fn(&[T]) -> R + Send + Sync + 'static,
{
  Combine::new(sources, combiner)
}

/// Flatten several same-typed sources into one stream, interleaved by
/// arrival.
pub fn merge<T: Send + 'static>(sources: Vec<ObservableRef<T>>) -> Merge<T> {
  from_iter(sources).flat_map(identity_source as fn(ObservableRef<T>) -> ObservableRef<T>)
}

/// The observable produced by [`merge`].
pub type Merge<T> =
  FlatMap<FromIter<Vec<ObservableRef<T>>>, fn(ObservableRef<T>) -> ObservableRef<T>, ObservableRef<T>>;

fn identity_source<T>(source: ObservableRef<T>) -> ObservableRef<T> {
  source
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn merge_interleaves_sources_by_arrival() {
    let first = PublishSubject::new();
    let second = PublishSubject::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let subscription = merge(vec![first.clone().box_it(), second.clone().box_it()])
      .subscribe(move |v| sink.lock().unwrap().push(v));

    first.next(1);
    second.next(2);
    first.next(3);

    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);

    subscription.unsubscribe();
    assert_eq!(first.count(), 0);
    assert_eq!(second.count(), 0);
  }

  #[test]
  fn box_it_preserves_the_source_behaviour() {
    let erased: ObservableRef<i32> = from_iter(vec![1, 2]).map(|v| v * 10).box_it();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    erased.subscribe(move |v| sink.lock().unwrap().push(v));

    assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
  }
}
