//! Operator implementations
//!
//! Each operator lives in its own module and follows the same shape: a
//! small struct wrapping the source (plus whatever configuration the
//! operator needs), an `Observable` impl whose `subscribe_observer` wires an
//! operator-specific observer between source and downstream, and tests at
//! the bottom. The combinator methods on
//! [`ObservableExt`](crate::observable::ObservableExt) construct these.

mod buffered;
mod combine;
mod distinct_until_changed;
mod filter;
mod filter_map;
mod flat_map;
mod flat_map_latest;
mod map;
mod multicast;
mod observe_on;
mod resubscribe;
mod start_with;
mod subscribe_on;
mod take;
mod take_while;
mod tap;
mod with_state;

pub use buffered::Buffered;
pub use combine::Combine;
pub use distinct_until_changed::DistinctUntilChanged;
pub use filter::Filter;
pub use filter_map::FilterMap;
pub use flat_map::FlatMap;
pub use flat_map_latest::FlatMapLatest;
pub use map::Map;
pub use multicast::Multicast;
pub use observe_on::ObserveOn;
pub use resubscribe::Resubscribing;
pub use start_with::StartWith;
pub use subscribe_on::SubscribeOn;
pub use take::Take;
pub use take_while::TakeWhile;
pub use tap::Tap;
pub use with_state::WithState;
