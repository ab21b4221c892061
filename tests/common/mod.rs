//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::time::Duration;

use futures::stream::{self, Stream};
use mvi_core::UiState;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Count(pub i64);

impl UiState for Count {}

/// Ordered log of `(event, step)` pairs appended by intents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Journal(pub Vec<(u32, u32)>);

impl UiState for Journal {}

pub fn add(n: i64) -> impl FnOnce(Count) -> Count + Send + 'static {
    move |count| Count(count.0 + n)
}

pub fn record(event: u32, step: u32) -> impl FnOnce(Journal) -> Journal + Send + 'static {
    move |mut journal| {
        journal.0.push((event, step));
        journal
    }
}

/// `steps` journal intents for `event`, each produced after a short sleep.
pub fn slow_steps(
    event: u32,
    steps: u32,
    delay: Duration,
) -> impl Stream<Item = impl FnOnce(Journal) -> Journal + Send + 'static> + Send + 'static {
    stream::unfold(0, move |step| async move {
        if step == steps {
            return None;
        }
        tokio::time::sleep(delay).await;
        Some((record(event, step), step + 1))
    })
}

/// Poll `condition` every few milliseconds for up to two seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
