//! Base trait for intents (state reduction steps) in MVI architecture.

/// A single, pure state transition.
///
/// Intents are produced by event mappers and prepare producers:
/// - User actions turned into state changes (increment, toggle, select)
/// - Results of async work (loaded data, failures modelled as state)
/// - Initialization steps run once when a processor starts
///
/// Applying an intent is the only way a processor's state changes.
/// `reduce` must be total: it never panics for any previous state.
/// It may read the processor's current state but must not write to it.
pub trait Intent<ST>: Send + 'static {
    /// Produce the next state from the previous one.
    fn reduce(self, previous: ST) -> ST;
}

impl<ST, F> Intent<ST> for F
where
    F: FnOnce(ST) -> ST + Send + 'static,
{
    fn reduce(self, previous: ST) -> ST {
        self(previous)
    }
}

/// Type-erased intent as stored by processors.
pub(crate) type BoxedIntent<ST> = Box<dyn FnOnce(ST) -> ST + Send>;

pub(crate) fn boxed<ST, I>(intent: I) -> BoxedIntent<ST>
where
    ST: 'static,
    I: Intent<ST>,
{
    Box::new(move |previous: ST| intent.reduce(previous))
}
