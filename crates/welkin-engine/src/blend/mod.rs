//! Texture-unit blend scheduling.
//!
//! Responsibilities:
//! - map cyclic-time keypoints to texture units (`TransitionScheduler`)
//! - answer, per frame, which two units are cross-fading and by how much
//! - keep the easing curves isolated in `interpolate`

mod interpolate;
mod scheduler;
mod unit;

pub use interpolate::InterpolationMethod;
pub use scheduler::{Blend, TransitionScheduler};
pub use unit::TextureUnit;
