//! Headless day-cycle driver.
//!
//! Stands in for the rendering loop: advances the scene clock once per
//! frame, queries each sky layer's scheduler, and logs where a renderer
//! would rebind texture slots and upload the blend uniform.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, trace};

use welkin_engine::blend::{InterpolationMethod, TextureUnit, TransitionScheduler};
use welkin_engine::logging::{self, LogConfig};
use welkin_engine::time::CyclicClock;

/// Frame pacing for the headless loop (~60 Hz).
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    logging::init(LogConfig::default());

    let seconds_per_cycle = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<f64>()
            .with_context(|| format!("invalid seconds-per-cycle argument {arg:?}"))?,
        None => 30.0,
    };

    let mut clock = CyclicClock::from_normalized(0.0, seconds_per_cycle);

    // Sky-texture layer: night, morning, noon and evening cube maps.
    let mut sky = TransitionScheduler::new();
    sky.push_keypoint(TextureUnit::new(1), 0.0);
    sky.push_keypoint(TextureUnit::new(2), 0.25);
    sky.push_keypoint(TextureUnit::new(3), 0.5);
    sky.push_keypoint(TextureUnit::new(4), 0.75);
    sky.set_transition_duration(0.2);
    sky.set_interpolation(InterpolationMethod::SmootherStep);

    // Star-field layer: cross-fades in at dusk, out at dawn.
    let mut stars = TransitionScheduler::new();
    stars.push_keypoint(TextureUnit::new(5), 0.2);
    stars.push_keypoint(TextureUnit::new(6), 0.8);
    stars.set_transition_duration(0.1);

    info!("running one full day at {seconds_per_cycle} s per cycle");

    let frames = (seconds_per_cycle / FRAME.as_secs_f64()).ceil() as u64;
    for _ in 0..frames {
        clock.update();
        let t = clock.normalized();

        for (name, layer) in [("sky", &mut sky), ("stars", &mut stars)] {
            let blend = layer.sample(t);
            if blend.back_changed || blend.src_changed {
                info!(
                    "t={t:.3} {name}: bind back=unit{} src=unit{}",
                    blend.back.index(),
                    blend.src.index()
                );
            }
            trace!("t={t:.3} {name}: src_alpha={:.3}", blend.src_alpha);
        }

        thread::sleep(FRAME);
    }

    info!("day complete, {} s simulated", clock.absolute_seconds());
    Ok(())
}
