//! MVI (Model-View-Intent) runtime for screen state management
//!
//! Every screen binds a pure reducer and an initial state into a
//! [`StateContainer`]: events are dispatched in, new states are broadcast to
//! subscribers, and one-shot effects are delivered through an [`EffectQueue`].
//! The [`TimeCapsule`] records every published state for replay debugging.
pub mod effects;
pub mod reducer;
pub mod store;
pub mod time_capsule;

pub use effects::{EffectQueue, EffectStream};
pub use reducer::Reducer;
pub use store::{ScreenLogic, StateContainer, StateSubscription, DEFAULT_KEEP_ALIVE};
pub use time_capsule::TimeCapsule;
