//! Model-View-Intent (MVI) architecture primitives.
//!
//! This module provides the building blocks processors are made of:
//! intents, the observable state container and the effect sink.
//!
//! # Architecture
//!
//! ```text
//! Event ──→ Mapper ──→ Intent* ──→ StateStore ──→ View
//!   ↑          │                                   │
//!   │          └──→ Effects ──→ EffectSink ──→ View│
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable representation of UI state, replay-1
//! - **Intent**: Pure `previous -> next` state transition
//! - **Effect**: One-shot signal to the view, replay-0

mod effect;
mod intent;
mod state;

pub use effect::{EffectSink, EffectStream, Effects};
pub use intent::Intent;
pub(crate) use intent::{boxed, BoxedIntent};
pub use state::{StateStore, StateStream, UiState};
