use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::{EffectSource, Lifecycle, Processor, ProcessorPhase};
use crate::config::ProcessorConfig;
use crate::mvi::{EffectSink, EffectStream, Effects};
use crate::scope::ScopeHandle;

type Prepare<EF> = Box<dyn FnOnce(Effects<EF>) -> BoxFuture<'static, ()> + Send>;
type Hook<EV, EF> = Arc<dyn Fn(Effects<EF>, EV) -> BoxFuture<'static, ()> + Send + Sync>;

/// Processor without state: events only produce effects.
pub struct EffectProcessor<EV, EF> {
    inner: Arc<Inner<EV, EF>>,
}

struct Inner<EV, EF> {
    sink: EffectSink<EF>,
    effects: Hook<EV, EF>,
    lifecycle: Lifecycle,
}

impl<EV, EF> Clone for EffectProcessor<EV, EF> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<EV, EF> Processor<EV> for EffectProcessor<EV, EF>
where
    EV: Send + 'static,
    EF: Clone + Send + 'static,
{
    fn send_event(&self, event: EV) {
        let inner = Arc::clone(&self.inner);
        self.inner.lifecycle.spawn_event("effects", async move {
            (inner.effects)(inner.sink.handle(), event).await;
        });
    }

    fn phase(&self) -> ProcessorPhase {
        self.inner.lifecycle.phase()
    }
}

impl<EV, EF: Clone + Send + 'static> EffectSource<EF> for EffectProcessor<EV, EF> {
    fn effect(&self) -> EffectStream<EF> {
        self.inner.sink.subscribe()
    }
}

/// Builder returned by [`ScopeHandle::effect_processor`].
pub struct EffectProcessorBuilder<EV, EF> {
    scope: ScopeHandle,
    label: String,
    config: ProcessorConfig,
    prepare: Option<Prepare<EF>>,
    effects: Option<Hook<EV, EF>>,
}

impl<EV, EF> EffectProcessorBuilder<EV, EF>
where
    EV: Send + 'static,
    EF: Clone + Send + 'static,
{
    pub(crate) fn new(scope: ScopeHandle) -> Self {
        Self {
            scope,
            label: "effect-processor".to_string(),
            config: ProcessorConfig::default(),
            prepare: None,
            effects: None,
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

    /// One-time hook run at construction.
    pub fn prepare<F, Fut>(mut self, prepare: F) -> Self
    where
        F: FnOnce(Effects<EF>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let prepare: Prepare<EF> = Box::new(move |effects| prepare(effects).boxed());
        self.prepare = Some(prepare);
        self
    }

    /// Per-event hook.
    pub fn effects<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Effects<EF>, EV) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: Hook<EV, EF> =
            Arc::new(move |effects: Effects<EF>, event: EV| hook(effects, event).boxed());
        self.effects = Some(hook);
        self
    }

    pub fn build(self) -> EffectProcessor<EV, EF> {
        let lifecycle = Lifecycle::new(&self.scope, self.label, self.config);
        let sink = EffectSink::with_drop_warning(
            lifecycle.label(),
            lifecycle.config().warn_on_dropped_effects,
        );
        let effects: Hook<EV, EF> = match self.effects {
            Some(hook) => hook,
            None => Arc::new(|_: Effects<EF>, _: EV| futures::future::ready(()).boxed()),
        };

        let prepare = self.prepare.map(|prepare| {
            let handle = sink.handle();
            async move { prepare(handle).await }.boxed()
        });
        lifecycle.start(prepare);

        EffectProcessor {
            inner: Arc::new(Inner {
                sink,
                effects,
                lifecycle,
            }),
        }
    }
}
