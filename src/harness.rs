//! Binds processors to view callbacks.
//!
//! Each `consume_*` call runs its loops (state render, effect trigger,
//! event forwarding) as one [`TaskGroup`]: they start together and stop
//! together, whether through [`Consumption::cancel`], scope cancellation or
//! a panic in any callback.

use futures::stream::{self, BoxStream};
use futures::StreamExt;

use crate::mvi::UiState;
use crate::processor::{EffectSource, Processor, StateSource};
use crate::scope::{ScopeHandle, TaskGroup};

/// Something that displays a model.
pub trait ViewRenderer<M>: Send + 'static {
    /// Renders (displays) the provided model.
    fn render(&mut self, model: M);
}

impl<M, F> ViewRenderer<M> for F
where
    F: FnMut(M) + Send + 'static,
{
    fn render(&mut self, model: M) {
        self(model)
    }
}

/// External source of events merged into a processor's input.
pub type EventSource<EV> = BoxStream<'static, EV>;

/// Handle to a running consumption. Dropping it does not stop the loops.
pub struct Consumption<P> {
    processor: P,
    group: TaskGroup,
}

impl<P> Consumption<P> {
    /// Stop every loop of this consumption at once.
    pub fn cancel(&self) {
        self.group.abort();
    }

    pub fn is_active(&self) -> bool {
        self.group.is_active()
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Forward a direct event alongside the merged sources.
    ///
    /// Dropped once the consumption is cancelled, like the merged sources.
    pub fn send_event<EV>(&self, event: EV)
    where
        P: Processor<EV>,
    {
        if !self.group.is_active() {
            tracing::debug!(group = %self.group.label(), "Event dropped: consumption cancelled");
            return;
        }
        self.processor.send_event(event);
    }
}

/// Render states of `processor` and forward `events` into it.
pub fn consume_state<EV, ST, P, R>(
    scope: &ScopeHandle,
    processor: P,
    render: R,
    events: Vec<EventSource<EV>>,
) -> Consumption<P>
where
    EV: Send + 'static,
    ST: UiState,
    P: Processor<EV> + StateSource<ST>,
    R: ViewRenderer<ST>,
{
    let group = scope.task_group("consumer");
    spawn_render(&group, processor.state(), render);
    spawn_events(&group, processor.clone(), events);
    Consumption { processor, group }
}

/// Render states, trigger effects and forward `events` into `processor`.
pub fn consume_state_effect<EV, ST, EF, P, R, T>(
    scope: &ScopeHandle,
    processor: P,
    render: R,
    trigger: T,
    events: Vec<EventSource<EV>>,
) -> Consumption<P>
where
    EV: Send + 'static,
    ST: UiState,
    EF: Send + 'static,
    P: Processor<EV> + StateSource<ST> + EffectSource<EF>,
    R: ViewRenderer<ST>,
    T: FnMut(EF) + Send + 'static,
{
    let group = scope.task_group("consumer");
    spawn_render(&group, processor.state(), render);
    spawn_trigger(&group, processor.effect(), trigger);
    spawn_events(&group, processor.clone(), events);
    Consumption { processor, group }
}

/// Trigger effects of `processor` and forward `events` into it.
pub fn consume_effect<EV, EF, P, T>(
    scope: &ScopeHandle,
    processor: P,
    trigger: T,
    events: Vec<EventSource<EV>>,
) -> Consumption<P>
where
    EV: Send + 'static,
    EF: Send + 'static,
    P: Processor<EV> + EffectSource<EF>,
    T: FnMut(EF) + Send + 'static,
{
    let group = scope.task_group("consumer");
    spawn_trigger(&group, processor.effect(), trigger);
    spawn_events(&group, processor.clone(), events);
    Consumption { processor, group }
}

fn spawn_render<ST, S, R>(group: &TaskGroup, mut states: S, mut render: R)
where
    ST: UiState,
    S: futures::Stream<Item = ST> + Send + Unpin + 'static,
    R: ViewRenderer<ST>,
{
    group.spawn("render", async move {
        while let Some(state) = states.next().await {
            render.render(state);
        }
    });
}

fn spawn_trigger<EF, S, T>(group: &TaskGroup, mut effects: S, mut trigger: T)
where
    EF: Send + 'static,
    S: futures::Stream<Item = EF> + Send + Unpin + 'static,
    T: FnMut(EF) + Send + 'static,
{
    group.spawn("trigger", async move {
        while let Some(effect) = effects.next().await {
            trigger(effect);
        }
    });
}

fn spawn_events<EV, P>(group: &TaskGroup, processor: P, events: Vec<EventSource<EV>>)
where
    EV: Send + 'static,
    P: Processor<EV>,
{
    if events.is_empty() {
        return;
    }
    group.spawn("events", async move {
        let mut merged = stream::select_all(events);
        while let Some(event) = merged.next().await {
            processor.send_event(event);
        }
    });
}
