//! Process-wide navigation bus and result slot
//!
//! Commands are a single-slot latest-value broadcast: publishing overwrites
//! any unconsumed previous command, and the router shell only ever acts on
//! the most recent intent. The result slot holds at most one pending value
//! per key; reading does not clear it, so a race between a screen closing
//! and a result arriving drops nothing.
use std::collections::HashMap;

use tokio::sync::watch;

use crate::navigation::command::{AppDestination, NavigationCommand, ResultValue};

pub struct Navigator {
    commands_tx: watch::Sender<Option<NavigationCommand>>,
    results_tx: watch::Sender<HashMap<String, ResultValue>>,
}

impl Navigator {
    pub fn new() -> Self {
        let (commands_tx, _) = watch::channel(None);
        let (results_tx, _) = watch::channel(HashMap::new());
        Self {
            commands_tx,
            results_tx,
        }
    }

    pub fn navigate(&self, destination: AppDestination) {
        self.publish(NavigationCommand::NavigateTo(destination));
    }

    pub fn navigate_back(&self) {
        self.publish(NavigationCommand::NavigateBack);
    }

    pub fn navigate_as_root(&self, destination: AppDestination) {
        self.publish(NavigationCommand::NavigateAsRoot(destination));
    }

    /// Store a result for `key`, then publish the back navigation. The store
    /// happens first so the caller's screen can observe the value no matter
    /// how the pop and the read interleave.
    pub fn navigate_back_with_result(&self, key: impl Into<String>, value: ResultValue) {
        let key = key.into();
        self.results_tx.send_modify(|results| {
            results.insert(key.clone(), value.clone());
        });
        self.publish(NavigationCommand::NavigateBackWithResult { key, value });
    }

    /// Latest-value stream of commands for the router shell.
    pub fn commands(&self) -> watch::Receiver<Option<NavigationCommand>> {
        self.commands_tx.subscribe()
    }

    /// Wait until a result for `key` is present and return it. The value
    /// stays in the slot until [`clear_result`](Self::clear_result) removes
    /// it. Returns `None` only if the navigator shuts down first.
    pub async fn result_value(&self, key: &str) -> Option<ResultValue> {
        let mut results = self.results_tx.subscribe();
        loop {
            if let Some(value) = results.borrow_and_update().get(key).cloned() {
                return Some(value);
            }
            results.changed().await.ok()?;
        }
    }

    /// Non-blocking read of a pending result.
    pub fn peek_result(&self, key: &str) -> Option<ResultValue> {
        self.results_tx.borrow().get(key).cloned()
    }

    /// Explicitly consume a pending result.
    pub fn clear_result(&self, key: &str) {
        self.results_tx.send_modify(|results| {
            results.remove(key);
        });
    }

    fn publish(&self, command: NavigationCommand) {
        tracing::debug!(?command, "publishing navigation command");
        self.commands_tx.send_replace(Some(command));
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::Duration;

    #[tokio::test]
    async fn newest_command_overwrites_an_unconsumed_one() {
        let navigator = Navigator::new();
        let mut commands = navigator.commands();

        navigator.navigate(AppDestination::Registration);
        navigator.navigate_back();

        commands.changed().await.unwrap();
        assert_eq!(
            commands.borrow_and_update().clone(),
            Some(NavigationCommand::NavigateBack)
        );
    }

    #[tokio::test]
    async fn result_survives_a_late_reader() {
        let navigator = Arc::new(Navigator::new());
        navigator.navigate_back_with_result(
            "COUNTRY_CODE",
            ResultValue::Text("US".to_string()),
        );

        // The previous screen only starts listening afterwards.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let value = navigator.result_value("COUNTRY_CODE").await;
        assert_eq!(value, Some(ResultValue::Text("US".to_string())));

        // Reading does not clear; clearing is explicit.
        assert!(navigator.peek_result("COUNTRY_CODE").is_some());
        navigator.clear_result("COUNTRY_CODE");
        assert!(navigator.peek_result("COUNTRY_CODE").is_none());
    }

    #[tokio::test]
    async fn result_value_wakes_a_waiting_reader() {
        let navigator = Arc::new(Navigator::new());
        let waiter = {
            let navigator = navigator.clone();
            tokio::spawn(async move { navigator.result_value("COUNTRY_CODE").await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        navigator
            .navigate_back_with_result("COUNTRY_CODE", ResultValue::Text("EG".to_string()));

        let value = waiter.await.unwrap();
        assert_eq!(value, Some(ResultValue::Text("EG".to_string())));
    }
}
