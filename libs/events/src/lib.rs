//! Structured lifecycle events and the bus that carries them.
//!
//! Never on the critical path for correctness: a dropped or unsubscribed
//! event must not change pipeline behavior (spec §4.6).

pub mod bus;
pub mod event;

pub use bus::{BroadcastEventBus, EventBus, NullEventBus};
pub use event::{ImportEvent, Topic};
