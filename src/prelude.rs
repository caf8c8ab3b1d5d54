//! Convenient re-exports of the commonly used surface

// Core contracts
pub use crate::observable::{Observable, ObservableExt, ObservableRef, ObservableState};
pub use crate::observer::{ClosureObserver, Observer, ObserverRef};
// Sources
pub use crate::observable::{
  callback, combine, create, empty, from_iter, merge, of, Callback, Create, Empty, FromIter,
  Merge, Of,
};
// Operators (usually reached via `ObservableExt`, exported for type names)
pub use crate::ops::{
  Buffered, Combine, DistinctUntilChanged, Filter, FilterMap, FlatMap, FlatMapLatest, Map,
  Multicast, ObserveOn, Resubscribing, StartWith, SubscribeOn, Take, TakeWhile, Tap, WithState,
};
// Schedulers
pub use crate::scheduler::{
  EventLoop, LoopScheduler, ScheduleError, Scheduler, SchedulerExt, SchedulerRef, SyncScheduler,
  Task, ThreadPoolScheduler, ThreadScheduler,
};
// Subjects
pub use crate::subject::{PublishSubject, ReplaySubject, StateSubject, Subject};
// Subscriptions
pub use crate::subscription::{
  AsyncCompositeSubscription, BoxSubscription, CompositeSubscription, Subscription,
  SubscriptionSlot, TeardownSubscription,
};
