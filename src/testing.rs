//! Helpers for testing processors.
//!
//! ```ignore
//! let scope = Scope::new();
//! let processor = counter_processor(&scope.handle());
//!
//! let test = processor_test(&processor, CounterEvent::Increase);
//! test.then_states(&[CounterState { value: 0 }, CounterState { value: 1 }]).await;
//! test.then_effects(&[]).await;
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::mvi::UiState;
use crate::processor::{EffectSource, Processor, StateSource};

/// How long assertions wait for the expected number of values.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Quiet period during which no further values may arrive.
pub const SETTLE_WINDOW: Duration = Duration::from_millis(50);

/// Records every item of a stream from a background task.
pub struct TestObserver<T> {
    values: Arc<Mutex<Vec<T>>>,
    notify: Arc<Notify>,
    task: JoinHandle<()>,
}

impl<T: Clone + Send + 'static> TestObserver<T> {
    /// Start recording `stream`. Must be called inside a tokio runtime.
    pub fn of<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        let values = Arc::new(Mutex::new(Vec::new()));
        let notify = Arc::new(Notify::new());

        let sink = Arc::clone(&values);
        let wake = Arc::clone(&notify);
        let task = tokio::spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(value) = stream.next().await {
                sink.lock().push(value);
                wake.notify_waiters();
            }
        });

        Self {
            values,
            notify,
            task,
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    /// Wait until at least `count` values arrived. Returns `false` on timeout.
    pub async fn await_count(&self, count: usize, within: Duration) -> bool {
        tokio::time::timeout(within, async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.values.lock().len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }

    /// Wait for `expected.len()` values, then assert they equal `expected`.
    pub async fn assert_values(&self, expected: &[T])
    where
        T: PartialEq + Debug,
    {
        self.await_count(expected.len(), DEFAULT_TIMEOUT).await;
        assert_eq!(self.values(), expected);
    }

    /// Like [`TestObserver::assert_values`], but also waits `window` after
    /// the expected values arrived so that extra values fail the assertion.
    /// Use it for empty expectations, which would otherwise pass at once.
    pub async fn assert_values_settled(&self, expected: &[T], window: Duration)
    where
        T: PartialEq + Debug,
    {
        self.await_count(expected.len(), DEFAULT_TIMEOUT).await;
        tokio::time::sleep(window).await;
        assert_eq!(self.values(), expected);
    }
}

impl<T> Drop for TestObserver<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Observers attached to a processor before its event was sent.
pub struct ProcessorTest<ST, EF> {
    pub states: TestObserver<ST>,
    pub effects: TestObserver<EF>,
}

impl<ST, EF> ProcessorTest<ST, EF>
where
    ST: UiState + Debug,
    EF: Clone + PartialEq + Debug + Send + 'static,
{
    /// Assert the exact states, with no extra state within [`SETTLE_WINDOW`].
    pub async fn then_states(&self, expected: &[ST]) {
        self.states
            .assert_values_settled(expected, SETTLE_WINDOW)
            .await;
    }

    /// Assert the exact effects, with no extra effect within [`SETTLE_WINDOW`].
    pub async fn then_effects(&self, expected: &[EF]) {
        self.effects
            .assert_values_settled(expected, SETTLE_WINDOW)
            .await;
    }
}

/// Subscribe to state and effects of `given`, then send `when_event`.
pub fn processor_test<EV, ST, EF, P>(given: &P, when_event: EV) -> ProcessorTest<ST, EF>
where
    ST: UiState,
    EF: Clone + Send + 'static,
    P: Processor<EV> + StateSource<ST> + EffectSource<EF>,
{
    let states = TestObserver::of(given.state());
    let effects = TestObserver::of(given.effect());
    given.send_event(when_event);
    ProcessorTest { states, effects }
}

/// Subscribe to the state of `given`, then send `when_event`.
pub fn state_processor_test<EV, ST, P>(given: &P, when_event: EV) -> TestObserver<ST>
where
    ST: UiState,
    P: Processor<EV> + StateSource<ST>,
{
    let states = TestObserver::of(given.state());
    given.send_event(when_event);
    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvi::EffectSink;

    #[tokio::test]
    async fn settled_assertion_accepts_quiet_stream() {
        let sink = EffectSink::<u8>::new("test");
        let observer = TestObserver::of(sink.subscribe());
        sink.send(1);
        observer
            .assert_values_settled(&[1], Duration::from_millis(20))
            .await;
    }

    #[tokio::test]
    #[should_panic]
    async fn settled_empty_assertion_catches_late_value() {
        let sink = EffectSink::<u8>::new("test");
        let observer = TestObserver::of(sink.subscribe());
        let effects = sink.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            effects.send(1);
        });
        observer.assert_values_settled(&[], SETTLE_WINDOW).await;
    }
}
