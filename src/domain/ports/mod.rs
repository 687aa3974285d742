//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces for the host scheduling primitives that deferred
//! work is composed from:
//! - InteractionTracker: in-flight user interaction/animation work
//! - FrameClock: paint-frame boundaries
//!
//! Infrastructure adapters implement these; tests substitute their own.

pub mod frame_clock;
pub mod interaction_tracker;

pub use frame_clock::FrameClock;
pub use interaction_tracker::InteractionTracker;
