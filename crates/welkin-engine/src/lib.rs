//! Welkin engine crate.
//!
//! This crate owns the timing + blending core of the sky dome: the cyclic
//! day/night clock and the per-layer texture-unit cross-fade scheduling
//! consumed by the rendering loop.

pub mod time;
pub mod blend;

pub mod logging;
