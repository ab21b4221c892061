use std::sync::Arc;

use futures::{FutureExt, Stream, StreamExt};

use super::{apply_intents, IntentStream, Lifecycle, Processor, ProcessorPhase, StateSource};
use crate::config::ProcessorConfig;
use crate::mvi::{boxed, BoxedIntent, Intent, StateStore, StateStream, UiState};
use crate::scope::ScopeHandle;

type Prepare<ST> = Box<dyn FnOnce() -> IntentStream<ST> + Send>;
type Mapper<EV, ST> = Arc<dyn Fn(EV) -> IntentStream<ST> + Send + Sync>;

/// Processor that maps events to intents and owns a state.
pub struct StateProcessor<EV, ST> {
    inner: Arc<Inner<EV, ST>>,
}

struct Inner<EV, ST> {
    store: StateStore<ST>,
    mapper: Mapper<EV, ST>,
    lifecycle: Lifecycle,
}

impl<EV, ST> Clone for StateProcessor<EV, ST> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<EV, ST> Processor<EV> for StateProcessor<EV, ST>
where
    EV: Send + 'static,
    ST: UiState,
{
    fn send_event(&self, event: EV) {
        let inner = Arc::clone(&self.inner);
        self.inner.lifecycle.spawn_event("states", async move {
            let intents = (inner.mapper)(event);
            apply_intents(
                inner.store.clone(),
                intents,
                inner.lifecycle.label().to_string(),
                inner.lifecycle.config().trace_intents,
            )
            .await;
        });
    }

    fn phase(&self) -> ProcessorPhase {
        self.inner.lifecycle.phase()
    }
}

impl<EV, ST: UiState> StateSource<ST> for StateProcessor<EV, ST> {
    fn state(&self) -> StateStream<ST> {
        self.inner.store.subscribe()
    }

    fn current_state(&self) -> ST {
        self.inner.store.get()
    }
}

/// Builder returned by [`ScopeHandle::state_processor`].
pub struct StateProcessorBuilder<EV, ST> {
    scope: ScopeHandle,
    default_state: ST,
    label: String,
    config: ProcessorConfig,
    prepare: Option<Prepare<ST>>,
    mapper: Option<Mapper<EV, ST>>,
}

impl<EV, ST> StateProcessorBuilder<EV, ST>
where
    EV: Send + 'static,
    ST: UiState,
{
    pub(crate) fn new(scope: ScopeHandle, default_state: ST) -> Self {
        Self {
            scope,
            default_state,
            label: "state-processor".to_string(),
            config: ProcessorConfig::default(),
            prepare: None,
            mapper: None,
        }
    }

    /// Name used in log records.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Intents produced once at construction, independent of any event.
    ///
    /// The stream may be infinite; it runs until the scope is cancelled.
    pub fn prepare<F, S, I>(mut self, prepare: F) -> Self
    where
        F: FnOnce() -> S + Send + 'static,
        S: Stream<Item = I> + Send + 'static,
        I: Intent<ST>,
    {
        let prepare: Prepare<ST> = Box::new(move || prepare().map(boxed::<ST, I>).boxed());
        self.prepare = Some(prepare);
        self
    }

    /// Per-event mapping to a lazy sequence of intents.
    pub fn states<F, S, I>(mut self, mapper: F) -> Self
    where
        F: Fn(EV) -> S + Send + Sync + 'static,
        S: Stream<Item = I> + Send + 'static,
        I: Intent<ST>,
    {
        let mapper: Mapper<EV, ST> =
            Arc::new(move |event: EV| mapper(event).map(boxed::<ST, I>).boxed());
        self.mapper = Some(mapper);
        self
    }

    pub fn build(self) -> StateProcessor<EV, ST> {
        let lifecycle = Lifecycle::new(&self.scope, self.label, self.config);
        let store = StateStore::new(self.default_state);
        let mapper: Mapper<EV, ST> = match self.mapper {
            Some(mapper) => mapper,
            None => Arc::new(|_: EV| futures::stream::empty::<BoxedIntent<ST>>().boxed()),
        };

        let prepare = self.prepare.map(|prepare| {
            let store = store.clone();
            let label = lifecycle.label().to_string();
            let trace = lifecycle.config().trace_intents;
            async move { apply_intents(store, prepare(), label, trace).await }.boxed()
        });
        lifecycle.start(prepare);

        StateProcessor {
            inner: Arc::new(Inner {
                store,
                mapper,
                lifecycle,
            }),
        }
    }
}
