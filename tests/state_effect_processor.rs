mod common;

use std::time::Duration;

use common::{add, wait_until, Count};
use futures::stream;
use mvi_core::testing::{processor_test, TestObserver};
use mvi_core::{EffectSource, Processor, ProcessorPhase, Scope, StateSource};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Add(i64),
    Toast(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Effect {
    Toast(&'static str),
    Added(i64),
    Ready,
}

#[tokio::test]
async fn states_effects_can_send_effects_and_intents() {
    let scope = Scope::new();
    let processor = scope
        .handle()
        .state_effect_processor::<Event, Count, Effect>(Count(0))
        .states_effects(|effects, event| {
            let intents = match event {
                Event::Add(n) => {
                    effects.send(Effect::Added(n));
                    vec![add(n)]
                }
                Event::Toast(_) => Vec::new(),
            };
            stream::iter(intents)
        })
        .build();

    let test = processor_test(&processor, Event::Add(2));
    test.then_states(&[Count(0), Count(2)]).await;
    test.then_effects(&[Effect::Added(2)]).await;
}

#[tokio::test]
async fn event_effects_hook_runs_once_per_event() {
    let scope = Scope::new();
    let processor = scope
        .handle()
        .state_effect_processor::<Event, Count, Effect>(Count(0))
        .event_effects(|effects, event| async move {
            if let Event::Toast(text) = event {
                effects.send(Effect::Toast(text));
            }
        })
        .build();

    let effects = TestObserver::of(processor.effect());
    processor.send_event(Event::Toast("saved"));
    processor.send_event(Event::Add(1));
    processor.send_event(Event::Toast("deleted"));

    assert!(effects.await_count(2, Duration::from_secs(2)).await);
    let mut received = effects.values();
    received.sort_by_key(|effect| format!("{effect:?}"));
    assert_eq!(
        received,
        vec![Effect::Toast("deleted"), Effect::Toast("saved")]
    );
    // No states_effects mapper: state untouched.
    assert_eq!(processor.current_state(), Count(0));
}

#[tokio::test]
async fn effect_sent_before_subscription_is_not_replayed() {
    let scope = Scope::new();
    let processor = scope
        .handle()
        .state_effect_processor::<Event, Count, Effect>(Count(0))
        .event_effects(|effects, event| async move {
            if let Event::Toast(text) = event {
                effects.send(Effect::Toast(text));
            }
        })
        .build();

    let early = TestObserver::of(processor.effect());
    processor.send_event(Event::Toast("first"));
    early.assert_values(&[Effect::Toast("first")]).await;

    let late = TestObserver::of(processor.effect());
    processor.send_event(Event::Toast("second"));
    late.assert_values(&[Effect::Toast("second")]).await;
    early
        .assert_values(&[Effect::Toast("first"), Effect::Toast("second")])
        .await;
}

#[tokio::test]
async fn effect_without_observer_is_dropped() {
    let scope = Scope::new();
    let processor = scope
        .handle()
        .state_effect_processor::<Event, Count, Effect>(Count(0))
        .event_effects(|effects, _event| async move {
            effects.send(Effect::Toast("lost"));
        })
        .states_effects(|_effects, event| {
            let n = match event {
                Event::Add(n) => n,
                Event::Toast(_) => 0,
            };
            stream::iter([add(n)])
        })
        .build();

    processor.send_event(Event::Add(1));
    assert!(wait_until(|| processor.current_state() == Count(1)).await);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let late = TestObserver::of(processor.effect());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(late.values().is_empty());
}

#[tokio::test]
async fn prepare_sends_effects_and_intents() {
    let scope = Scope::new();
    let handle = scope.handle();
    let builder = handle
        .state_effect_processor::<Event, Count, Effect>(Count(0))
        .prepare(|effects| {
            stream::once(async move {
                // Give the test time to subscribe before the effect goes out.
                tokio::time::sleep(Duration::from_millis(20)).await;
                effects.send(Effect::Ready);
                add(100)
            })
        });
    let processor = builder.build();
    let effects = TestObserver::of(processor.effect());

    assert_eq!(processor.phase(), ProcessorPhase::Preparing);
    effects.assert_values(&[Effect::Ready]).await;
    assert!(wait_until(|| processor.current_state() == Count(100)).await);
    assert!(wait_until(|| processor.phase() == ProcessorPhase::Processing).await);
}

#[tokio::test]
async fn panicking_event_effects_hook_stops_processor() {
    let scope = Scope::new();
    let processor = scope
        .handle()
        .state_effect_processor::<Event, Count, Effect>(Count(0))
        .event_effects(|_effects, event| async move {
            if event == Event::Toast("boom") {
                panic!("hook failed");
            }
        })
        .states_effects(|_effects, _event| stream::iter([add(1)]))
        .build();

    processor.send_event(Event::Toast("boom"));
    assert!(wait_until(|| processor.phase() == ProcessorPhase::Stopped).await);

    let before = processor.current_state();
    processor.send_event(Event::Add(1));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(processor.current_state(), before);
}
