//! Observable single-slot state container.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::intent::Intent;

/// Marker trait for UI state objects.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (all data needed to render the view)
/// - Comparable (PartialEq for de-duplicating updates)
pub trait UiState: Clone + PartialEq + Send + Sync + 'static {}

/// Thread-safe, observable holder of the latest state.
///
/// Always holds exactly one value. Every observer gets its own unbounded
/// queue: a new observer receives the current value first, then every
/// subsequent replacement, in order, with nothing skipped. A replacement
/// equal to the current value is not published.
///
/// Reads go through a separate snapshot, so an intent may call
/// [`StateStore::get`] while it is being reduced. It must not call `set` or
/// `reduce_and_set` on the same store.
pub struct StateStore<ST> {
    inner: Arc<Mutex<StoreInner<ST>>>,
    // Lock order: `inner`, then `snapshot`.
    snapshot: Arc<Mutex<ST>>,
}

struct StoreInner<ST> {
    value: ST,
    observers: Vec<mpsc::UnboundedSender<ST>>,
}

impl<ST> Clone for StateStore<ST> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<ST: UiState> StateStore<ST> {
    pub fn new(initial: ST) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(initial.clone())),
            inner: Arc::new(Mutex::new(StoreInner {
                value: initial,
                observers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> ST {
        self.snapshot.lock().clone()
    }

    /// Replace the current state.
    ///
    /// Returns `false` when `value` equals the current state and nothing
    /// was published.
    pub fn set(&self, value: ST) -> bool {
        let mut inner = self.inner.lock();
        self.publish(&mut inner, value)
    }

    /// Apply `intent` to the current state and publish the result.
    ///
    /// The read, the reduction and the publish happen under one lock, so
    /// two concurrent reductions never observe the same previous state.
    pub fn reduce_and_set<I: Intent<ST>>(&self, intent: I) -> bool {
        let mut inner = self.inner.lock();
        let next = intent.reduce(inner.value.clone());
        self.publish(&mut inner, next)
    }

    fn publish(&self, inner: &mut StoreInner<ST>, value: ST) -> bool {
        if !inner.replace(value) {
            return false;
        }
        *self.snapshot.lock() = inner.value.clone();
        true
    }

    /// Subscribe to the current value and all future replacements.
    pub fn subscribe(&self) -> StateStream<ST> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        // Cannot fail: the receiver is alive in this scope.
        let _ = tx.send(inner.value.clone());
        inner.observers.push(tx);
        StateStream { rx }
    }

    /// Number of observers that have not been dropped yet.
    pub fn observer_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.observers.iter().filter(|tx| !tx.is_closed()).count()
    }
}

impl<ST: UiState> StoreInner<ST> {
    fn replace(&mut self, value: ST) -> bool {
        if self.value == value {
            return false;
        }
        self.observers.retain(|tx| tx.send(value.clone()).is_ok());
        self.value = value;
        true
    }
}

/// Replay-1 stream of state values returned by [`StateStore::subscribe`].
///
/// Never terminates while the store is alive.
pub struct StateStream<ST> {
    rx: mpsc::UnboundedReceiver<ST>,
}

impl<ST> Stream for StateStream<ST> {
    type Item = ST;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ST>> {
        self.rx.poll_recv(cx)
    }
}
