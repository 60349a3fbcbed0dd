//! Reducer contract for the MVI runtime
//!
//! A reducer is a pure function from the previous state and an event to a new
//! state and an optional one-time effect. It performs no I/O and never mutates
//! its inputs; async work belongs in [`ScreenLogic::handle_event`] handlers
//! that dispatch follow-up events when they finish.
//!
//! [`ScreenLogic::handle_event`]: crate::mvi::store::ScreenLogic::handle_event
pub trait Reducer: Send + Sync + 'static {
    /// Immutable screen state. Every transition produces a new value.
    type State: Clone + Send + Sync + 'static;

    /// Closed set of events the screen can process.
    type Event: Send + 'static;

    /// Closed set of one-shot effects the screen can emit.
    type Effect: Send + 'static;

    /// Reduce the previous state with an event into a new state and an
    /// optional effect.
    ///
    /// Event variants a reducer does not explicitly match must return the
    /// previous state unchanged with no effect. That identity default lets a
    /// reducer ignore events that only matter to the async handler layer.
    fn reduce(
        &self,
        previous: &Self::State,
        event: &Self::Event,
    ) -> (Self::State, Option<Self::Effect>);
}
