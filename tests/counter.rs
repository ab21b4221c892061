use mvi_core::config::ProcessorConfig;
use mvi_core::sample::{counter_processor, CounterEffect, CounterEvent, CounterState};
use mvi_core::testing::processor_test;
use mvi_core::Scope;

#[tokio::test]
async fn when_increase_event_emitted_then_state_changed() {
    let scope = Scope::new();
    let processor = counter_processor(&scope.handle(), ProcessorConfig::default());

    let test = processor_test(&processor, CounterEvent::Increase);
    test.then_states(&[CounterState { value: 0 }, CounterState { value: 1 }])
        .await;
    test.then_effects(&[]).await;
}

#[tokio::test]
async fn when_decrease_event_emitted_then_state_changed() {
    let scope = Scope::new();
    let processor = counter_processor(&scope.handle(), ProcessorConfig::default());

    let test = processor_test(&processor, CounterEvent::Decrease);
    test.then_states(&[CounterState { value: 0 }, CounterState { value: -1 }])
        .await;
    test.then_effects(&[]).await;
}

#[tokio::test]
async fn when_navigate_event_emitted_then_effect_emitted() {
    let scope = Scope::new();
    let processor = counter_processor(&scope.handle(), ProcessorConfig::default());

    let test = processor_test(&processor, CounterEvent::NavigateToSecondScreen);
    test.then_effects(&[CounterEffect::NavigateToSecondScreen])
        .await;
    test.then_states(&[CounterState { value: 0 }]).await;
}
