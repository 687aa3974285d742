//! Host scheduling adapters for the domain ports.

pub mod frame_clock;
pub mod interaction_gate;

pub use frame_clock::IntervalFrameClock;
pub use interaction_gate::{InteractionGate, InteractionHandle};
