//! Subscription handles and their containers
//!
//! A [`Subscription`] is an idempotent cancellation handle returned from
//! `subscribe`. Disposing it tears the subscription down at most once, no
//! matter how many times or from how many threads `unsubscribe` is called.
//!
//! [`CompositeSubscription`] aggregates many handles so a component can tear
//! down everything it owns with a single call, which is the only supported
//! teardown path for long-lived components.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use crate::scheduler::{Scheduler, SchedulerRef};

/// Handle to cancel an active subscription.
pub trait Subscription {
  /// Tear the subscription down. Only the first call has an effect.
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;
}

/// Boxed subscription, the form returned from `subscribe`.
pub type BoxSubscription = Box<dyn Subscription + Send + Sync>;

impl<S> Subscription for Box<S>
where
  S: Subscription + ?Sized,
{
  #[inline]
  fn unsubscribe(&self) {
    (**self).unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

impl<S> Subscription for Arc<S>
where
  S: Subscription + ?Sized,
{
  #[inline]
  fn unsubscribe(&self) {
    (**self).unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

/// Subscription backed by a one-shot teardown closure.
///
/// Clones share the same state, so disposing any clone closes them all.
#[derive(Clone)]
pub struct TeardownSubscription {
  inner: Arc<TeardownInner>,
}

struct TeardownInner {
  closed: AtomicBool,
  teardown: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl TeardownSubscription {
  pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
    Self {
      inner: Arc::new(TeardownInner {
        closed: AtomicBool::new(false),
        teardown: Mutex::new(Some(Box::new(teardown))),
      }),
    }
  }

  /// An open subscription with nothing to tear down. Sources use this as a
  /// cancellation flag: they stop producing once it reports closed.
  pub fn empty() -> Self {
    Self {
      inner: Arc::new(TeardownInner {
        closed: AtomicBool::new(false),
        teardown: Mutex::new(None),
      }),
    }
  }

  /// An already-closed subscription, for work that finished synchronously.
  pub fn closed() -> Self {
    Self {
      inner: Arc::new(TeardownInner {
        closed: AtomicBool::new(true),
        teardown: Mutex::new(None),
      }),
    }
  }

  pub fn boxed(self) -> BoxSubscription {
    Box::new(self)
  }
}

impl Subscription for TeardownSubscription {
  fn unsubscribe(&self) {
    if self.inner.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let teardown = self.inner.teardown.lock().unwrap().take();
    if let Some(teardown) = teardown {
      teardown();
    }
  }

  fn is_closed(&self) -> bool {
    self.inner.closed.load(Ordering::Acquire)
  }
}

/// Holds at most one inner subscription, replaceable after creation.
///
/// Operators that produce their inner subscription only after `subscribe`
/// returns (deferred subscribes, self-disposing operators, resubscription
/// cycles) hand a slot to their observer first and fill it later. Filling a
/// slot that was closed in the meantime disposes the incoming subscription
/// immediately.
#[derive(Clone, Default)]
pub struct SubscriptionSlot {
  inner: Arc<Mutex<SlotInner>>,
}

#[derive(Default)]
struct SlotInner {
  closed: bool,
  current: Option<BoxSubscription>,
}

impl SubscriptionSlot {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store `subscription`, disposing whatever the slot held before. If the
  /// slot is already closed the subscription is disposed instead of stored.
  pub fn fill(&self, subscription: BoxSubscription) {
    let previous = {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        drop(inner);
        subscription.unsubscribe();
        return;
      }
      inner.current.replace(subscription)
    };
    if let Some(previous) = previous {
      previous.unsubscribe();
    }
  }

  pub fn boxed(self) -> BoxSubscription {
    Box::new(self)
  }
}

impl Subscription for SubscriptionSlot {
  fn unsubscribe(&self) {
    let current = {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        return;
      }
      inner.closed = true;
      inner.current.take()
    };
    if let Some(current) = current {
      current.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    self.inner.lock().unwrap().closed
  }
}

/// Aggregates subscriptions for bulk, idempotent teardown.
///
/// Adding to a disposed container disposes the handle immediately instead of
/// storing it, and already-closed handles are never stored, so a container
/// does not grow with dead entries over a component's lifetime.
#[derive(Clone, Default)]
pub struct CompositeSubscription {
  inner: Arc<Mutex<CompositeInner>>,
}

#[derive(Default)]
struct CompositeInner {
  closed: bool,
  held: SmallVec<[BoxSubscription; 1]>,
}

impl CompositeSubscription {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&self, subscription: impl Subscription + Send + Sync + 'static) {
    self.add_boxed(Box::new(subscription));
  }

  pub fn add_boxed(&self, subscription: BoxSubscription) {
    if subscription.is_closed() {
      return;
    }
    {
      let mut inner = self.inner.lock().unwrap();
      if !inner.closed {
        inner.held.retain(|held| !held.is_closed());
        inner.held.push(subscription);
        return;
      }
    }
    subscription.unsubscribe();
  }

  pub fn len(&self) -> usize {
    self.inner.lock().unwrap().held.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn boxed(self) -> BoxSubscription {
    Box::new(self)
  }
}

impl Subscription for CompositeSubscription {
  fn unsubscribe(&self) {
    let held = {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.held)
    };
    for subscription in held {
      // A failing teardown must not stop the remaining handles from being
      // disposed.
      if panic::catch_unwind(AssertUnwindSafe(|| subscription.unsubscribe())).is_err() {
        log::warn!("subscription teardown panicked; continuing with remaining handles");
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.inner.lock().unwrap().closed
  }
}

/// Composite whose mutations are confined to one scheduler.
///
/// `add` and `unsubscribe` both run on the given scheduler, so a component
/// can register subscriptions from arbitrary threads while the container
/// itself is only ever touched from its owner's execution context.
pub struct AsyncCompositeSubscription {
  dispose_on: SchedulerRef,
  container: CompositeSubscription,
  closed: AtomicBool,
}

impl AsyncCompositeSubscription {
  pub fn new(dispose_on: SchedulerRef) -> Self {
    Self {
      dispose_on,
      container: CompositeSubscription::new(),
      closed: AtomicBool::new(false),
    }
  }

  pub fn add(&self, subscription: BoxSubscription) {
    let container = self.container.clone();
    self
      .dispose_on
      .execute(Box::new(move || container.add_boxed(subscription)));
  }
}

impl Subscription for AsyncCompositeSubscription {
  fn unsubscribe(&self) {
    if self
      .closed
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
    {
      let container = self.container.clone();
      self
        .dispose_on
        .execute(Box::new(move || container.unsubscribe()));
    }
  }

  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }
}
