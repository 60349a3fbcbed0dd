//! Router shell folding navigation commands into a destination stack
//!
//! Subscribes once to the navigator bus and applies each command as a stack
//! operation. Screen rendering is outside this crate; the stack is the
//! source of truth for what would be on screen.
use tokio::sync::watch;

use crate::navigation::command::{AppDestination, NavigationCommand};

pub struct Router {
    stack: Vec<AppDestination>,
}

impl Router {
    pub fn new(root: AppDestination) -> Self {
        Self { stack: vec![root] }
    }

    /// Apply one command to the stack. Back navigation at the root is a
    /// no-op; the root is never popped.
    pub fn apply(&mut self, command: &NavigationCommand) {
        match command {
            NavigationCommand::NavigateTo(destination) => {
                self.stack.push(destination.clone());
            }
            NavigationCommand::NavigateBack
            | NavigationCommand::NavigateBackWithResult { .. } => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
            NavigationCommand::NavigateAsRoot(destination) => {
                self.stack.clear();
                self.stack.push(destination.clone());
            }
        }
        tracing::info!(current = ?self.current(), depth = self.depth(), "navigation applied");
    }

    pub fn current(&self) -> &AppDestination {
        self.stack.last().expect("stack always holds the root")
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume the bus until the navigator shuts down, applying each
    /// published command as it lands.
    pub async fn run(mut self, mut commands: watch::Receiver<Option<NavigationCommand>>) {
        // Apply a command published before the shell attached.
        if let Some(command) = commands.borrow_and_update().clone() {
            self.apply(&command);
        }
        while commands.changed().await.is_ok() {
            if let Some(command) = commands.borrow_and_update().clone() {
                self.apply(&command);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::command::ResultValue;

    #[test]
    fn push_pop_and_root_replacement() {
        let mut router = Router::new(AppDestination::Login);

        router.apply(&NavigationCommand::NavigateTo(AppDestination::Registration));
        router.apply(&NavigationCommand::NavigateTo(
            AppDestination::CountryCodePicker {
                code: Some("EG".to_string()),
            },
        ));
        assert_eq!(router.depth(), 3);

        router.apply(&NavigationCommand::NavigateBackWithResult {
            key: "COUNTRY_CODE".to_string(),
            value: ResultValue::Text("EG".to_string()),
        });
        assert_eq!(router.current(), &AppDestination::Registration);

        router.apply(&NavigationCommand::NavigateAsRoot(AppDestination::Feed));
        assert_eq!(router.depth(), 1);
        assert_eq!(router.current(), &AppDestination::Feed);
    }

    #[test]
    fn back_at_root_is_a_no_op() {
        let mut router = Router::new(AppDestination::Login);
        router.apply(&NavigationCommand::NavigateBack);
        assert_eq!(router.depth(), 1);
        assert_eq!(router.current(), &AppDestination::Login);
    }
}
