//! Time subsystem.
//!
//! Provides the wall-clock-driven "time of day" shared by all sky layers.
//! Intended usage:
//! - one `CyclicClock` per scene
//! - call `update()` once per frame, read `normalized()`, and feed the value
//!   to each layer's `TransitionScheduler`

mod cyclic_clock;

pub use cyclic_clock::{CyclicClock, RunState, SECONDS_PER_DAY};
