use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{FutureExt, Stream, StreamExt};

use super::{
    apply_intents, EffectSource, IntentStream, Lifecycle, Processor, ProcessorPhase, StateSource,
};
use crate::config::ProcessorConfig;
use crate::mvi::{
    boxed, BoxedIntent, EffectSink, EffectStream, Effects, Intent, StateStore, StateStream,
    UiState,
};
use crate::scope::ScopeHandle;

type Prepare<ST, EF> = Box<dyn FnOnce(Effects<EF>) -> IntentStream<ST> + Send>;
type EventEffects<EV, EF> = Arc<dyn Fn(Effects<EF>, EV) -> BoxFuture<'static, ()> + Send + Sync>;
type StatesEffects<EV, ST, EF> = Arc<dyn Fn(Effects<EF>, EV) -> IntentStream<ST> + Send + Sync>;

/// Processor that owns a state and can also emit one-shot effects.
///
/// Every event feeds two sibling tasks: the `event_effects` hook and the
/// `states_effects` mapper. Their relative order is undefined.
pub struct StateEffectProcessor<EV, ST, EF> {
    inner: Arc<Inner<EV, ST, EF>>,
}

struct Inner<EV, ST, EF> {
    store: StateStore<ST>,
    sink: EffectSink<EF>,
    event_effects: Option<EventEffects<EV, EF>>,
    states_effects: StatesEffects<EV, ST, EF>,
    lifecycle: Lifecycle,
}

impl<EV, ST, EF> Clone for StateEffectProcessor<EV, ST, EF> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<EV, ST, EF> Processor<EV> for StateEffectProcessor<EV, ST, EF>
where
    EV: Clone + Send + 'static,
    ST: UiState,
    EF: Clone + Send + 'static,
{
    fn send_event(&self, event: EV) {
        if self.inner.event_effects.is_some() {
            let inner = Arc::clone(&self.inner);
            let event = event.clone();
            self.inner.lifecycle.spawn_event("event-effects", async move {
                if let Some(hook) = &inner.event_effects {
                    hook(inner.sink.handle(), event).await;
                }
            });
        }

        let inner = Arc::clone(&self.inner);
        self.inner.lifecycle.spawn_event("states-effects", async move {
            let intents = (inner.states_effects)(inner.sink.handle(), event);
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

impl<EV, ST: UiState, EF> StateSource<ST> for StateEffectProcessor<EV, ST, EF> {
    fn state(&self) -> StateStream<ST> {
        self.inner.store.subscribe()
    }

    fn current_state(&self) -> ST {
        self.inner.store.get()
    }
}

impl<EV, ST, EF: Clone + Send + 'static> EffectSource<EF> for StateEffectProcessor<EV, ST, EF> {
    fn effect(&self) -> EffectStream<EF> {
        self.inner.sink.subscribe()
    }
}

/// Builder returned by [`ScopeHandle::state_effect_processor`].
pub struct StateEffectProcessorBuilder<EV, ST, EF> {
    scope: ScopeHandle,
    default_state: ST,
    label: String,
    config: ProcessorConfig,
    prepare: Option<Prepare<ST, EF>>,
    event_effects: Option<EventEffects<EV, EF>>,
    states_effects: Option<StatesEffects<EV, ST, EF>>,
}

impl<EV, ST, EF> StateEffectProcessorBuilder<EV, ST, EF>
where
    EV: Clone + Send + 'static,
    ST: UiState,
    EF: Clone + Send + 'static,
{
    pub(crate) fn new(scope: ScopeHandle, default_state: ST) -> Self {
        Self {
            scope,
            default_state,
            label: "state-effect-processor".to_string(),
            config: ProcessorConfig::default(),
            prepare: None,
            event_effects: None,
            states_effects: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Intents produced once at construction; effects may be sent meanwhile.
    pub fn prepare<F, S, I>(mut self, prepare: F) -> Self
    where
        F: FnOnce(Effects<EF>) -> S + Send + 'static,
        S: Stream<Item = I> + Send + 'static,
        I: Intent<ST>,
    {
        let prepare: Prepare<ST, EF> =
            Box::new(move |effects| prepare(effects).map(boxed::<ST, I>).boxed());
        self.prepare = Some(prepare);
        self
    }

    /// Side-effect-only hook run once per event.
    pub fn event_effects<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Effects<EF>, EV) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: EventEffects<EV, EF> =
            Arc::new(move |effects: Effects<EF>, event: EV| hook(effects, event).boxed());
        self.event_effects = Some(hook);
        self
    }

    /// Per-event mapping to intents; may also send effects.
    pub fn states_effects<F, S, I>(mut self, mapper: F) -> Self
    where
        F: Fn(Effects<EF>, EV) -> S + Send + Sync + 'static,
        S: Stream<Item = I> + Send + 'static,
        I: Intent<ST>,
    {
        let mapper: StatesEffects<EV, ST, EF> = Arc::new(move |effects: Effects<EF>, event: EV| {
            mapper(effects, event).map(boxed::<ST, I>).boxed()
        });
        self.states_effects = Some(mapper);
        self
    }

    pub fn build(self) -> StateEffectProcessor<EV, ST, EF> {
        let lifecycle = Lifecycle::new(&self.scope, self.label, self.config);
        let store = StateStore::new(self.default_state);
        let sink = EffectSink::with_drop_warning(
            lifecycle.label(),
            lifecycle.config().warn_on_dropped_effects,
        );
        let states_effects: StatesEffects<EV, ST, EF> = match self.states_effects {
            Some(mapper) => mapper,
            None => Arc::new(|_: Effects<EF>, _: EV| {
                futures::stream::empty::<BoxedIntent<ST>>().boxed()
            }),
        };

        let prepare = self.prepare.map(|prepare| {
            let store = store.clone();
            let effects = sink.handle();
            let label = lifecycle.label().to_string();
            let trace = lifecycle.config().trace_intents;
            async move { apply_intents(store, prepare(effects), label, trace).await }.boxed()
        });
        lifecycle.start(prepare);

        StateEffectProcessor {
            inner: Arc::new(Inner {
                store,
                sink,
                event_effects: self.event_effects,
                states_effects,
                lifecycle,
            }),
        }
    }
}
