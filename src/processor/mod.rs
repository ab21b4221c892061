//! Event processors: the units that own an event → state/effect pipeline.
//!
//! Three flavours share the [`Processor`] capability and add
//! [`StateSource`] and/or [`EffectSource`]:
//!
//! | Flavour                 | state | effect |
//! |-------------------------|-------|--------|
//! | [`StateProcessor`]      | yes   | no     |
//! | [`StateEffectProcessor`]| yes   | yes    |
//! | [`EffectProcessor`]     | no    | yes    |
//!
//! Processors are created from a [`ScopeHandle`] and live until that scope
//! is cancelled or one of their tasks panics.

mod effect;
mod state;
mod state_effect;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::config::ProcessorConfig;
use crate::mvi::{BoxedIntent, EffectStream, StateStore, StateStream, UiState};
use crate::scope::{ScopeHandle, TaskGroup};

pub use effect::{EffectProcessor, EffectProcessorBuilder};
pub use state::{StateProcessor, StateProcessorBuilder};
pub use state_effect::{StateEffectProcessor, StateEffectProcessorBuilder};

/// Entry point shared by every processor flavour.
pub trait Processor<EV>: Clone + Send + Sync + 'static {
    /// Hand `event` to the processor. Never blocks and never fails; an
    /// event sent to a stopped processor is dropped.
    fn send_event(&self, event: EV);

    fn phase(&self) -> ProcessorPhase;
}

/// Processors that expose an observable state.
pub trait StateSource<ST: UiState> {
    /// Replay-1 stream: the current state first, then every change.
    fn state(&self) -> StateStream<ST>;

    fn current_state(&self) -> ST;
}

/// Processors that expose one-shot effects.
pub trait EffectSource<EF> {
    /// Replay-0 stream of effects sent after this call.
    fn effect(&self) -> EffectStream<EF>;
}

/// Lifecycle phase of a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessorPhase {
    Idle = 0,
    /// The prepare producer is still running. Events are processed meanwhile.
    Preparing = 1,
    Processing = 2,
    /// Scope cancelled or a task panicked. Terminal.
    Stopped = 3,
}

impl ScopeHandle {
    /// Start building a processor with state only.
    pub fn state_processor<EV, ST>(&self, default_state: ST) -> StateProcessorBuilder<EV, ST>
    where
        EV: Send + 'static,
        ST: UiState,
    {
        StateProcessorBuilder::new(self.clone(), default_state)
    }

    /// Start building a processor with state and effects.
    pub fn state_effect_processor<EV, ST, EF>(
        &self,
        default_state: ST,
    ) -> StateEffectProcessorBuilder<EV, ST, EF>
    where
        EV: Clone + Send + 'static,
        ST: UiState,
        EF: Clone + Send + 'static,
    {
        StateEffectProcessorBuilder::new(self.clone(), default_state)
    }

    /// Start building an effect-only processor.
    pub fn effect_processor<EV, EF>(&self) -> EffectProcessorBuilder<EV, EF>
    where
        EV: Send + 'static,
        EF: Clone + Send + 'static,
    {
        EffectProcessorBuilder::new(self.clone())
    }
}

pub(crate) type IntentStream<ST> = BoxStream<'static, BoxedIntent<ST>>;

/// Task group plus phase bookkeeping shared by all flavours.
#[derive(Clone)]
pub(crate) struct Lifecycle {
    group: TaskGroup,
    phase: Arc<AtomicU8>,
    config: ProcessorConfig,
}

impl Lifecycle {
    pub(crate) fn new(scope: &ScopeHandle, label: String, config: ProcessorConfig) -> Self {
        Self {
            group: scope.task_group(label),
            phase: Arc::new(AtomicU8::new(ProcessorPhase::Idle as u8)),
            config,
        }
    }

    pub(crate) fn label(&self) -> &str {
        self.group.label()
    }

    pub(crate) fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub(crate) fn phase(&self) -> ProcessorPhase {
        if !self.group.is_active() {
            return ProcessorPhase::Stopped;
        }
        match self.phase.load(Ordering::SeqCst) {
            0 => ProcessorPhase::Idle,
            1 => ProcessorPhase::Preparing,
            2 => ProcessorPhase::Processing,
            _ => ProcessorPhase::Stopped,
        }
    }

    /// Idle → Preparing while `prepare` runs, then Processing.
    ///
    /// Without a prepare future the processor goes straight to Processing.
    pub(crate) fn start(&self, prepare: Option<BoxFuture<'static, ()>>) {
        tracing::info!(processor = %self.label(), "Processor started");
        let Some(prepare) = prepare else {
            self.phase
                .store(ProcessorPhase::Processing as u8, Ordering::SeqCst);
            return;
        };

        self.phase
            .store(ProcessorPhase::Preparing as u8, Ordering::SeqCst);
        let phase = Arc::clone(&self.phase);
        let label = self.label().to_string();
        self.group.spawn("prepare", async move {
            prepare.await;
            if phase
                .compare_exchange(
                    ProcessorPhase::Preparing as u8,
                    ProcessorPhase::Processing as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok()
            {
                tracing::debug!(processor = %label, "Prepare finished");
            }
        });
    }

    /// Spawn per-event work, dropping it when the processor is stopped.
    pub(crate) fn spawn_event<F>(&self, task: &'static str, fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        if !self.group.is_active() {
            tracing::warn!(processor = %self.label(), task, "Event dropped: processor stopped");
            return;
        }
        self.group.spawn(task, fut);
    }
}

/// Drain `intents` into `store` strictly in production order.
pub(crate) async fn apply_intents<ST: UiState>(
    store: StateStore<ST>,
    mut intents: IntentStream<ST>,
    label: String,
    trace_intents: bool,
) {
    while let Some(intent) = intents.next().await {
        let changed = store.reduce_and_set(intent);
        if trace_intents {
            tracing::trace!(processor = %label, changed, "Intent applied");
        }
    }
}
