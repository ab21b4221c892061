//! Model-View-Intent processing core.
//!
//! Turns a stream of events into a de-duplicated, observable state and a
//! separate stream of one-shot effects. See [`processor`] for the three
//! processor flavours and [`harness`] for wiring them to a view.

pub mod config;
pub mod harness;
pub mod logging;
pub mod mvi;
pub mod processor;
pub mod sample;
pub mod scope;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use harness::{consume_effect, consume_state, consume_state_effect, Consumption, ViewRenderer};
pub use mvi::{EffectSink, EffectStream, Effects, Intent, StateStore, StateStream, UiState};
pub use processor::{
    EffectProcessor, EffectSource, Processor, ProcessorPhase, StateEffectProcessor,
    StateProcessor, StateSource,
};
pub use scope::{Scope, ScopeHandle, TaskGroup};
