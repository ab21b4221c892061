//! Counter screen used by the `mvi-counter` binary and the tests.

use futures::stream;

use crate::config::ProcessorConfig;
use crate::mvi::{Intent, UiState};
use crate::processor::StateEffectProcessor;
use crate::scope::ScopeHandle;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterState {
    pub value: i64,
}

impl UiState for CounterState {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterEvent {
    Increase,
    Decrease,
    NavigateToSecondScreen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterEffect {
    NavigateToSecondScreen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterIntent {
    Increment,
    Decrement,
}

impl Intent<CounterState> for CounterIntent {
    fn reduce(self, previous: CounterState) -> CounterState {
        match self {
            CounterIntent::Increment => CounterState {
                value: previous.value.saturating_add(1),
            },
            CounterIntent::Decrement => CounterState {
                value: previous.value.saturating_sub(1),
            },
        }
    }
}

pub type CounterProcessor = StateEffectProcessor<CounterEvent, CounterState, CounterEffect>;

/// Build the counter processor in `scope`.
pub fn counter_processor(scope: &ScopeHandle, config: ProcessorConfig) -> CounterProcessor {
    scope
        .state_effect_processor::<CounterEvent, CounterState, CounterEffect>(
            CounterState::default(),
        )
        .label("counter")
        .config(config)
        .event_effects(|effects, event| async move {
            if event == CounterEvent::NavigateToSecondScreen {
                effects.send(CounterEffect::NavigateToSecondScreen);
            }
        })
        .states_effects(|_effects, event| {
            let intents = match event {
                CounterEvent::Increase => vec![CounterIntent::Increment],
                CounterEvent::Decrease => vec![CounterIntent::Decrement],
                CounterEvent::NavigateToSecondScreen => Vec::new(),
            };
            stream::iter(intents)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_and_decrement_are_inverse() {
        let state = CounterState { value: 3 };
        let state = CounterIntent::Increment.reduce(state);
        assert_eq!(state.value, 4);
        let state = CounterIntent::Decrement.reduce(state);
        assert_eq!(state.value, 3);
    }

    #[test]
    fn reduction_saturates_at_bounds() {
        let max = CounterState { value: i64::MAX };
        assert_eq!(CounterIntent::Increment.reduce(max).value, i64::MAX);
    }
}
