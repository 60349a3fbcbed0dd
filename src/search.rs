//! Debounced, cancel-and-restart search pipeline
//!
//! Derives a query from a container's state stream, collapses bursts of
//! changes to the settled last value, and runs at most one fetch at a time.
//! A new distinct query cancels the in-flight fetch before starting its own,
//! and every attempt carries a monotonic sequence number so a result from a
//! superseded fetch can never overwrite state for the current query.
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, Instant};

/// Default settle window for query bursts.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Handle identifying one fetch attempt.
///
/// Fetch code must check [`is_current`](Self::is_current) before applying a
/// result; a stale attempt means a newer query superseded this one.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    seq: u64,
    latest: Arc<AtomicU64>,
}

impl FetchAttempt {
    /// Claim the next attempt number, superseding all previous attempts that
    /// share the same counter.
    pub fn begin(latest: &Arc<AtomicU64>) -> Self {
        let seq = latest.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            seq,
            latest: Arc::clone(latest),
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.seq
    }
}

/// Drive the pipeline until the state stream closes.
///
/// `query_of` projects the query text out of a state value; `fetch` produces
/// the future that loads results for one settled query and dispatches events
/// back into the owning container. Dropping the returned future (container
/// teardown aborts the task running it) cancels any in-flight fetch.
pub async fn run_pipeline<S, Q, F, Fut>(
    mut states: watch::Receiver<S>,
    debounce: Duration,
    latest: Arc<AtomicU64>,
    query_of: Q,
    fetch: F,
) where
    S: Clone + Send + Sync,
    Q: Fn(&S) -> String + Send,
    F: Fn(String, FetchAttempt) -> Fut + Send,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut inflight: Option<Pin<Box<Fut>>> = None;
    let mut active_query: Option<String> = None;
    // The initial query value is fetched after one settle window, matching
    // the behavior of a debounced stream that replays its latest value.
    let mut pending: Option<String> = Some(query_of(&states.borrow_and_update()));
    let settle = tokio::time::sleep(debounce);
    tokio::pin!(settle);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                pending = Some(query_of(&states.borrow_and_update()));
                // Any state publication restarts the settle window.
                settle.as_mut().reset(Instant::now() + debounce);
            }
            _ = &mut settle, if pending.is_some() => {
                let query = pending.take().expect("guarded by branch condition");
                if active_query.as_deref() == Some(query.as_str()) {
                    continue;
                }
                // Cancel-and-restart: drop the superseded fetch before
                // claiming the next attempt.
                inflight = None;
                let attempt = FetchAttempt::begin(&latest);
                tracing::debug!(query = %query, seq = attempt.seq(), "starting search fetch");
                inflight = Some(Box::pin(fetch(query.clone(), attempt)));
                active_query = Some(query);
            }
            _ = async { inflight.as_mut().expect("guarded by branch condition").as_mut().await },
                if inflight.is_some() =>
            {
                inflight = None;
            }
        }
    }
}
