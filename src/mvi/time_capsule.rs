//! Time-travel history of published states
//!
//! Records every state a container publishes, in publication order. Restoring
//! an entry goes through the container so that all subscribers observe the
//! rollback; the capsule itself is plain storage.
use serde::Serialize;

#[derive(Debug)]
pub struct TimeCapsule<S> {
    states: Vec<S>,
}

impl<S: Serialize> TimeCapsule<S> {
    /// Dump the recorded history as JSON, for replay debugging.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.states)
    }
}

impl<S> TimeCapsule<S> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Append a published state to the history.
    pub fn record(&mut self, state: S) {
        self.states.push(state);
    }

    /// All recorded states, oldest first.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.states.get(index)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Discard the history. Called when the owning container tears down.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl<S> Default for TimeCapsule<S> {
    fn default() -> Self {
        Self::new()
    }
}
