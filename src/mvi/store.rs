//! State container binding a reducer and an initial state into a live,
//! observable unit
//!
//! The container owns the current state, broadcasts it to subscribers with
//! latest-value semantics, serializes event dispatch, records history in a
//! [`TimeCapsule`], and forwards one-shot effects to an [`EffectQueue`].
//!
//! Activation is lazy: nothing runs until the first subscriber attaches. When
//! the last subscriber detaches the container stays warm for a keep-alive
//! window so a recreated UI can resubscribe cheaply; once the window expires
//! all registered tasks are aborted, history and pending effects are
//! discarded, and the next subscription reactivates from scratch.
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::mvi::effects::{EffectQueue, EffectStream};
use crate::mvi::reducer::Reducer;
use crate::mvi::time_capsule::TimeCapsule;

/// Grace window between the last unsubscribe and container teardown.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Screen behavior layered on top of a [`Reducer`].
///
/// `handle_event` is the synchronous dispatch entry point: it may consult
/// collaborators, launch async work through [`StateContainer::spawn`] or
/// [`StateContainer::spawn_guarded`], and forwards events that only change
/// state to [`StateContainer::set_state`]. The reducer itself stays pure.
pub trait ScreenLogic: Reducer + Sized {
    /// One-time hook run on first subscription. May register tasks that
    /// dispatch follow-up events asynchronously.
    fn initial_load(&self, _container: &StateContainer<Self>) {}

    /// Route an event: side-effecting variants are handled here, everything
    /// else goes straight to the reducer.
    fn handle_event(&self, container: &StateContainer<Self>, event: Self::Event) {
        container.set_state(event);
    }
}

struct Lifecycle {
    /// True between activation and teardown.
    active: bool,
    subscribers: usize,
    /// Bumped per activation so a stale keep-alive timer cannot tear down a
    /// reactivated container.
    generation: u64,
    tasks: Vec<JoinHandle<()>>,
    keep_alive_timer: Option<JoinHandle<()>>,
}

struct Inner<L: ScreenLogic> {
    logic: L,
    initial_state: L::State,
    state_tx: watch::Sender<L::State>,
    /// Serializes reduce + publish + record so state publications are
    /// strictly ordered by dispatch call order.
    dispatch_lock: Mutex<()>,
    capsule: Mutex<TimeCapsule<L::State>>,
    effects: Mutex<EffectQueue<L::Effect>>,
    lifecycle: Mutex<Lifecycle>,
    keep_alive: Duration,
    runtime: Handle,
}

/// Per-screen state container. Cheap to clone; clones share the same state.
pub struct StateContainer<L: ScreenLogic> {
    inner: Arc<Inner<L>>,
}

impl<L: ScreenLogic> Clone for StateContainer<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ScreenLogic> StateContainer<L> {
    /// Create a container with the default keep-alive window.
    ///
    /// Must be called from within a tokio runtime: the container captures the
    /// current handle for its task registry and keep-alive timer.
    pub fn new(logic: L, initial_state: L::State) -> Self {
        Self::with_keep_alive(logic, initial_state, DEFAULT_KEEP_ALIVE)
    }

    pub fn with_keep_alive(logic: L, initial_state: L::State, keep_alive: Duration) -> Self {
        let (state_tx, _) = watch::channel(initial_state.clone());
        Self {
            inner: Arc::new(Inner {
                logic,
                initial_state,
                state_tx,
                dispatch_lock: Mutex::new(()),
                capsule: Mutex::new(TimeCapsule::new()),
                effects: Mutex::new(EffectQueue::new()),
                lifecycle: Mutex::new(Lifecycle {
                    active: false,
                    subscribers: 0,
                    generation: 0,
                    tasks: Vec::new(),
                    keep_alive_timer: None,
                }),
                keep_alive,
                runtime: Handle::current(),
            }),
        }
    }

    /// Attach a subscriber. The first subscription activates the container:
    /// the initial state is seeded into the time capsule and the screen's
    /// initial-load hook runs.
    pub fn subscribe(&self) -> StateSubscription<L> {
        let needs_activation = {
            let mut lifecycle = self.lifecycle();
            lifecycle.subscribers += 1;
            if let Some(timer) = lifecycle.keep_alive_timer.take() {
                timer.abort();
            }
            if lifecycle.active {
                false
            } else {
                lifecycle.active = true;
                lifecycle.generation += 1;
                true
            }
        };

        if needs_activation {
            tracing::debug!("activating state container");
            self.capsule().record(self.current_state());
            self.inner.logic.initial_load(self);
        }

        StateSubscription {
            rx: self.inner.state_tx.subscribe(),
            container: self.clone(),
        }
    }

    /// Synchronous dispatch entry point: routes the event through the
    /// screen's handler, which decides between side effects and reduction.
    pub fn dispatch(&self, event: L::Event) {
        self.inner.logic.handle_event(self, event);
    }

    /// Reduce the current state with an event and publish the result.
    ///
    /// Publication is a no-op once the container has been torn down; only a
    /// successful publication appends to the time capsule and forwards the
    /// effect.
    pub fn set_state(&self, event: L::Event) {
        let _ordering = self
            .inner
            .dispatch_lock
            .lock()
            .expect("dispatch lock poisoned");

        let (new_state, effect) = {
            let previous = self.inner.state_tx.borrow().clone();
            self.inner.logic.reduce(&previous, &event)
        };

        if !self.lifecycle().active {
            tracing::trace!("dropping publication for torn-down container");
            return;
        }

        self.inner.state_tx.send_replace(new_state.clone());
        self.capsule().record(new_state);
        if let Some(effect) = effect {
            self.inner
                .effects
                .lock()
                .expect("effect queue poisoned")
                .push(effect);
        }
    }

    /// Republish a previously recorded state by history index.
    ///
    /// The reducer is not re-run, no effect is emitted, and the history is
    /// left untouched; every subscriber observes the rollback through the
    /// normal multicast path. Returns false for an out-of-range index.
    pub fn restore(&self, index: usize) -> bool {
        let Some(state) = self.capsule().get(index).cloned() else {
            return false;
        };
        let _ordering = self
            .inner
            .dispatch_lock
            .lock()
            .expect("dispatch lock poisoned");
        if !self.lifecycle().active {
            return false;
        }
        self.inner.state_tx.send_replace(state);
        true
    }

    pub fn current_state(&self) -> L::State {
        self.inner.state_tx.borrow().clone()
    }

    /// Snapshot of the recorded state history, oldest first.
    pub fn state_history(&self) -> Vec<L::State> {
        self.capsule().states().to_vec()
    }

    /// The recorded history as JSON, for replay debugging.
    pub fn history_json(&self) -> serde_json::Result<String>
    where
        L::State: serde::Serialize,
    {
        self.capsule().export_json()
    }

    /// Attach the single effect consumer. `None` while another consumer holds
    /// the stream.
    pub fn effects(&self) -> Option<EffectStream<L::Effect>> {
        self.inner
            .effects
            .lock()
            .expect("effect queue poisoned")
            .attach()
    }

    /// Raw latest-value stream of states for container-internal pipelines.
    ///
    /// Unlike [`subscribe`](Self::subscribe) this does not count toward the
    /// keep-alive subscriber total and never triggers activation.
    pub fn state_watch(&self) -> watch::Receiver<L::State> {
        self.inner.state_tx.subscribe()
    }

    /// Run async work owned by this container. The task is aborted when the
    /// container tears down.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.inner.runtime.spawn(future);
        let mut lifecycle = self.lifecycle();
        lifecycle.tasks.retain(|task| !task.is_finished());
        lifecycle.tasks.push(handle);
    }

    /// Like [`spawn`](Self::spawn), but a panic inside the task is caught at
    /// the boundary and converted into a failure event instead of silently
    /// killing the task.
    pub fn spawn_guarded<F, E>(&self, future: F, on_panic: E)
    where
        F: Future<Output = ()> + Send + 'static,
        E: FnOnce(String) -> L::Event + Send + 'static,
    {
        let container = self.clone();
        self.spawn(async move {
            if let Err(panic) = AssertUnwindSafe(future).catch_unwind().await {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unexpected task failure".to_string());
                tracing::error!(%message, "screen task panicked");
                container.dispatch(on_panic(message));
            }
        });
    }

    fn teardown_if_idle(&self, generation: u64) {
        let tasks = {
            let mut lifecycle = self.lifecycle();
            if !lifecycle.active
                || lifecycle.subscribers > 0
                || lifecycle.generation != generation
            {
                return;
            }
            lifecycle.active = false;
            lifecycle.keep_alive_timer = None;
            std::mem::take(&mut lifecycle.tasks)
        };
        for task in tasks {
            task.abort();
        }
        self.capsule().clear();
        *self.inner.effects.lock().expect("effect queue poisoned") = EffectQueue::new();
        self.inner
            .state_tx
            .send_replace(self.inner.initial_state.clone());
        tracing::debug!("state container torn down after keep-alive window");
    }

    fn lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.inner.lifecycle.lock().expect("lifecycle poisoned")
    }

    fn capsule(&self) -> std::sync::MutexGuard<'_, TimeCapsule<L::State>> {
        self.inner.capsule.lock().expect("time capsule poisoned")
    }
}

/// Live subscription to a container's state stream.
///
/// Holds the keep-alive reference: dropping the last subscription starts the
/// teardown grace timer.
pub struct StateSubscription<L: ScreenLogic> {
    rx: watch::Receiver<L::State>,
    container: StateContainer<L>,
}

impl<L: ScreenLogic> StateSubscription<L> {
    /// The most recent state. A new subscriber sees the latest value
    /// immediately, never history.
    pub fn current(&self) -> L::State {
        self.rx.borrow().clone()
    }

    /// Wait for the next publication and return it.
    pub async fn next(&mut self) -> Option<L::State> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl<L: ScreenLogic> Drop for StateSubscription<L> {
    fn drop(&mut self) {
        let mut lifecycle = self.container.lifecycle();
        lifecycle.subscribers = lifecycle.subscribers.saturating_sub(1);
        if lifecycle.subscribers > 0 || !lifecycle.active {
            return;
        }
        let container = self.container.clone();
        let generation = lifecycle.generation;
        let keep_alive = container.inner.keep_alive;
        lifecycle.keep_alive_timer = Some(container.inner.runtime.clone().spawn(async move {
            tokio::time::sleep(keep_alive).await;
            container.teardown_if_idle(generation);
        }));
    }
}
