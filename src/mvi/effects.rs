//! One-shot effect delivery for screen containers
//!
//! Effects are buffered while no consumer is attached and drained in FIFO
//! order once one attaches. Each effect reaches exactly one consumer exactly
//! once: a navigation-on-success instruction survives a moment where the UI
//! is not observing, but is never replayed.
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

struct Shared<F> {
    tx: mpsc::UnboundedSender<F>,
    // Receiver parks here between consumers; taking it enforces the
    // single-consumer rule.
    slot: Mutex<Option<mpsc::UnboundedReceiver<F>>>,
}

/// Buffered single-consumer queue of one-shot effects.
pub struct EffectQueue<F> {
    shared: Arc<Shared<F>>,
}

impl<F> EffectQueue<F> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(Shared {
                tx,
                slot: Mutex::new(Some(rx)),
            }),
        }
    }

    /// Enqueue an effect. Buffered until a consumer drains it.
    pub fn push(&self, effect: F) {
        // Send only fails when the receiver was dropped, which cannot happen
        // while the queue or a stream holds it.
        let _ = self.shared.tx.send(effect);
    }

    /// Attach the consumer. Returns `None` while another consumer is active;
    /// dropping the returned stream allows a later consumer to resume where
    /// the previous one stopped.
    pub fn attach(&self) -> Option<EffectStream<F>> {
        let rx = self.shared.slot.lock().expect("effect slot poisoned").take()?;
        Some(EffectStream {
            rx: Some(rx),
            shared: Arc::clone(&self.shared),
        })
    }
}

impl<F> Default for EffectQueue<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive handle to the effect stream of one container.
pub struct EffectStream<F> {
    rx: Option<mpsc::UnboundedReceiver<F>>,
    shared: Arc<Shared<F>>,
}

impl<F> EffectStream<F> {
    /// Wait for the next effect.
    pub async fn next(&mut self) -> Option<F> {
        self.rx.as_mut()?.recv().await
    }

    /// Drain one buffered effect without waiting.
    pub fn try_next(&mut self) -> Option<F> {
        self.rx.as_mut()?.try_recv().ok()
    }
}

impl<F> Drop for EffectStream<F> {
    fn drop(&mut self) {
        if let Some(rx) = self.rx.take() {
            if let Ok(mut slot) = self.shared.slot.lock() {
                *slot = Some(rx);
            }
        }
    }
}
