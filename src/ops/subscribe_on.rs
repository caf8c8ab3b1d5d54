//! Subscribe-on operator

use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::ObserverRef;
use crate::scheduler::{SchedulerExt, SchedulerRef};
use crate::subscription::{BoxSubscription, CompositeSubscription, SubscriptionSlot};

/// Defers the act of subscribing, which may itself have a cost (registering
/// a platform callback, say), onto a scheduler.
///
/// Emissions, once flowing, are delivered on whatever thread the source
/// naturally emits from; only the subscribe call moves.
pub struct SubscribeOn<S> {
  source: Arc<S>,
  scheduler: SchedulerRef,
}

impl<S> SubscribeOn<S> {
  pub(crate) fn new(source: S, scheduler: SchedulerRef) -> Self {
    Self {
      source: Arc::new(source),
      scheduler,
    }
  }
}

impl<T, S> Observable<T> for SubscribeOn<S>
where
  T: Send + 'static,
  S: Observable<T> + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let slot = SubscriptionSlot::new();

    let source = Arc::clone(&self.source);
    let filler = slot.clone();
    let pending = self.scheduler.schedule_fn(move || {
      filler.fill(source.subscribe_observer(observer));
    });

    let subscriptions = CompositeSubscription::new();
    subscriptions.add_boxed(pending);
    subscriptions.add(slot);
    subscriptions.boxed()
  }
}
