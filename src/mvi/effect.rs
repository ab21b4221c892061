//! One-shot effect delivery without replay.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Multicast sink for one-shot effects.
///
/// An effect reaches only the observers subscribed at the moment it is
/// sent. With no observer the effect is dropped; this is the documented
/// delivery contract, not an error.
pub struct EffectSink<EF> {
    inner: Arc<SinkInner<EF>>,
}

struct SinkInner<EF> {
    label: String,
    warn_on_drop: bool,
    observers: Mutex<Vec<mpsc::UnboundedSender<EF>>>,
}

impl<EF> Clone for EffectSink<EF> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<EF: Clone + Send + 'static> EffectSink<EF> {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_drop_warning(label, false)
    }

    /// Like [`EffectSink::new`], logging dropped effects at `warn` instead of `debug`.
    pub fn with_drop_warning(label: impl Into<String>, warn_on_drop: bool) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                label: label.into(),
                warn_on_drop,
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Deliver `effect` to every current observer. Never blocks.
    ///
    /// Returns the number of observers that received it.
    pub fn send(&self, effect: EF) -> usize {
        let mut observers = self.inner.observers.lock();
        observers.retain(|tx| tx.send(effect.clone()).is_ok());
        let delivered = observers.len();
        drop(observers);

        if delivered == 0 {
            if self.inner.warn_on_drop {
                tracing::warn!(processor = %self.inner.label, "Effect dropped: no observers");
            } else {
                tracing::debug!(processor = %self.inner.label, "Effect dropped: no observers");
            }
        }
        delivered
    }

    /// Subscribe to effects sent from now on.
    pub fn subscribe(&self) -> EffectStream<EF> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.observers.lock().push(tx);
        EffectStream { rx }
    }

    /// Capability handed to mapping closures.
    pub fn handle(&self) -> Effects<EF> {
        Effects { sink: self.clone() }
    }
}

/// Send-only handle to an [`EffectSink`].
///
/// Passed into prepare and event hooks so they can emit effects.
pub struct Effects<EF> {
    sink: EffectSink<EF>,
}

impl<EF> Clone for Effects<EF> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<EF: Clone + Send + 'static> Effects<EF> {
    pub fn send(&self, effect: EF) {
        self.sink.send(effect);
    }
}

/// Replay-0 stream returned by [`EffectSink::subscribe`].
pub struct EffectStream<EF> {
    rx: mpsc::UnboundedReceiver<EF>,
}

impl<EF> Stream for EffectStream<EF> {
    type Item = EF;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<EF>> {
        self.rx.poll_recv(cx)
    }
}
