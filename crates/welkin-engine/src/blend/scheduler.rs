use log::warn;

use super::interpolate::InterpolationMethod;
use super::unit::TextureUnit;

/// Registered (cyclic time, unit) pair: the unit becomes the fade-in target
/// around `time`.
#[derive(Debug, Copy, Clone)]
struct Keypoint {
    time: f64,
    unit: TextureUnit,
}

/// Derived entry: the original key shifted forward by half the transition
/// duration, wrapped into [0,1). Pair selection happens on the shifted key,
/// so each transition window straddles its keypoint symmetrically and the
/// 1.0 ≡ 0.0 seam needs no special casing.
#[derive(Debug, Copy, Clone)]
struct BackKeypoint {
    shifted: f64,
    unit: TextureUnit,
}

/// Blend snapshot for one query time.
///
/// Produced by [`TransitionScheduler::sample`]; all fields come from a single
/// recompute and are mutually consistent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Blend {
    /// Unit currently fading out.
    pub back: TextureUnit,
    /// Unit currently fading in.
    pub src: TextureUnit,
    /// Eased weight of `src`, in [0,1]. Upload as the blend uniform.
    pub src_alpha: f32,
    /// The back unit differs from the previous query; rebind it.
    pub back_changed: bool,
    /// The src unit differs from the previous query; rebind it.
    pub src_changed: bool,
}

/// Per-layer cross-fade scheduler over cyclic time.
///
/// Keypoints map positions in the day cycle to texture units. For any query
/// time the scheduler answers which two units are the active fading pair
/// ("back" fading out, "src" fading in), the eased blend weight, and whether
/// either unit changed since the last query (so callers rebind only when
/// needed).
///
/// Usage:
/// - setup: `push_keypoint` in strictly increasing key order, then tune with
///   `set_transition_duration` / `set_interpolation`
/// - per frame: query with the normalized time from the scene's `CyclicClock`
///
/// All read accessors share one internal recompute per distinct query time;
/// repeated queries at the same time are O(1). The derived back-keypoint
/// table is rebuilt lazily after configuration changes.
///
/// Blend shape: for a keypoint at `k` with transition duration `d`, the
/// active pair switches at `k + d/2`; alpha ramps from 0 at `k - d/2` to 1 at
/// `k` and holds at 1 until the switch, so the displayed unit is continuous
/// through every transition and across the cycle seam. A duration of zero
/// degenerates to an instantaneous cut at each key.
#[derive(Debug)]
pub struct TransitionScheduler {
    keypoints: Vec<Keypoint>,
    transition_duration: f64,
    interpolation: InterpolationMethod,

    back_keypoints: Vec<BackKeypoint>,
    back_dirty: bool,

    // Memoized last-query state.
    last_time: Option<f64>,
    back: TextureUnit,
    src: TextureUnit,
    src_alpha: f64,
    back_changed: bool,
    src_changed: bool,
}

const DEFAULT_TRANSITION_DURATION: f64 = 0.1;

impl Default for TransitionScheduler {
    fn default() -> Self {
        Self {
            keypoints: Vec::new(),
            transition_duration: DEFAULT_TRANSITION_DURATION,
            interpolation: InterpolationMethod::default(),
            back_keypoints: Vec::new(),
            back_dirty: true,
            last_time: None,
            back: TextureUnit::NONE,
            src: TextureUnit::NONE,
            src_alpha: 0.0,
            back_changed: false,
            src_changed: false,
        }
    }
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `unit` to become the fade-in target around cyclic `time`.
    ///
    /// Keys must arrive in strictly increasing order within [0,1); a
    /// violating push is logged and ignored. Pushing may shrink the smallest
    /// inter-keypoint gap, in which case the transition duration is clamped
    /// down to the new gap.
    pub fn push_keypoint(&mut self, unit: TextureUnit, time: f64) {
        if !(0.0..1.0).contains(&time) {
            warn!("keypoint at {time} ignored: cyclic time must lie in [0,1)");
            return;
        }
        if let Some(last) = self.keypoints.last() {
            if time <= last.time {
                warn!(
                    "keypoint at {time} ignored: keys must be strictly increasing (last key {})",
                    last.time
                );
                return;
            }
        }

        self.keypoints.push(Keypoint { time, unit });
        self.transition_duration = self.transition_duration.min(self.smallest_gap());
        self.back_dirty = true;
        self.last_time = None;
    }

    /// Sets the cross-fade window width in cyclic time.
    ///
    /// The value is clamped to `[0, smallest inter-keypoint gap]` (the
    /// wraparound gap between the last and first key included); the duration
    /// actually applied is returned.
    pub fn set_transition_duration(&mut self, duration: f64) -> f64 {
        self.transition_duration = duration.clamp(0.0, self.smallest_gap());
        self.back_dirty = true;
        self.last_time = None;
        self.transition_duration
    }

    #[inline]
    pub fn transition_duration(&self) -> f64 {
        self.transition_duration
    }

    /// Sets the easing curve shaping future alpha values. Keypoint structure
    /// is unaffected.
    pub fn set_interpolation(&mut self, method: InterpolationMethod) {
        self.interpolation = method;
        self.last_time = None;
    }

    #[inline]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    #[inline]
    pub fn keypoint_count(&self) -> usize {
        self.keypoints.len()
    }

    /// Unit currently fading out at `time`.
    pub fn back_unit(&mut self, time: f64) -> TextureUnit {
        self.update(time);
        self.back
    }

    /// Unit currently fading in at `time`.
    pub fn src_unit(&mut self, time: f64) -> TextureUnit {
        self.update(time);
        self.src
    }

    /// Eased weight of the src unit at `time`, in [0,1].
    pub fn src_alpha(&mut self, time: f64) -> f32 {
        self.update(time);
        self.src_alpha as f32
    }

    /// True when the back unit changed since this flag was last read.
    ///
    /// The flag is cleared by the read; it accumulates across queries until
    /// then, so a caller that only checks once per frame misses nothing.
    pub fn has_back_changed(&mut self, time: f64) -> bool {
        self.update(time);
        std::mem::take(&mut self.back_changed)
    }

    /// True when the src unit changed since this flag was last read.
    ///
    /// Clear-on-read, like [`has_back_changed`](Self::has_back_changed).
    pub fn has_src_changed(&mut self, time: f64) -> bool {
        self.update(time);
        std::mem::take(&mut self.src_changed)
    }

    /// All per-frame readings from a single recompute.
    ///
    /// Reads (and clears) both change flags.
    pub fn sample(&mut self, time: f64) -> Blend {
        self.update(time);
        Blend {
            back: self.back,
            src: self.src,
            src_alpha: self.src_alpha as f32,
            back_changed: std::mem::take(&mut self.back_changed),
            src_changed: std::mem::take(&mut self.src_changed),
        }
    }

    /// Shared recompute behind the read accessors. Skipped entirely when
    /// `time` matches the memoized last query.
    fn update(&mut self, time: f64) {
        let time = wrap(time);
        if self.last_time == Some(time) {
            return;
        }
        if self.back_dirty {
            self.rebuild_back_keypoints();
        }

        let (back, src, alpha) = self.resolve(time);

        // Sticky until read: a pair change must survive until the caller
        // checks the flag, however many queries happen in between.
        self.back_changed |= back != self.back;
        self.src_changed |= src != self.src;

        self.back = back;
        self.src = src;
        self.src_alpha = alpha;
        self.last_time = Some(time);
    }

    fn resolve(&self, time: f64) -> (TextureUnit, TextureUnit, f64) {
        let len = self.back_keypoints.len();
        if len < 2 {
            // No blending is possible with a single source.
            return (TextureUnit::NONE, TextureUnit::NONE, 0.0);
        }

        // upper_bound with wraparound: the src entry is the first shifted key
        // strictly after `time`, falling back to the first entry once the
        // query is past the last key; back is its cyclic predecessor.
        let src_index = self.back_keypoints.partition_point(|kp| kp.shifted <= time) % len;
        let back_index = (src_index + len - 1) % len;

        let src = self.back_keypoints[src_index];
        let back = self.back_keypoints[back_index];

        if back.unit == src.unit || self.transition_duration == 0.0 {
            return (back.unit, src.unit, 0.0);
        }

        // Unwrap the query one cycle back when it sits numerically past the
        // src key (the seam case), then measure progress across the window.
        let mut t = time;
        if t > src.shifted {
            t -= 1.0;
        }
        let progress = 1.0 - (src.shifted - t) / self.transition_duration;

        // The ramp completes at the keypoint's nominal time (mid-window) and
        // holds at 1.0 until the pair advances at the window's end.
        let linear = (2.0 * progress).clamp(0.0, 1.0);
        (back.unit, src.unit, self.interpolation.apply(linear))
    }

    fn rebuild_back_keypoints(&mut self) {
        let offset = self.transition_duration * 0.5;

        self.back_keypoints.clear();
        self.back_keypoints.extend(self.keypoints.iter().map(|kp| BackKeypoint {
            shifted: wrap(kp.time + offset),
            unit: kp.unit,
        }));
        // Shifting can wrap the tail keys past 1.0; restore sorted order.
        self.back_keypoints.sort_by(|a, b| a.shifted.total_cmp(&b.shifted));

        self.back_dirty = false;
    }

    /// Smallest gap between cyclically adjacent keypoints, including the
    /// wraparound gap between the last and first key. `1.0` (the whole
    /// cycle) with fewer than two keypoints.
    fn smallest_gap(&self) -> f64 {
        if self.keypoints.len() < 2 {
            return 1.0;
        }

        let mut smallest = f64::INFINITY;
        for pair in self.keypoints.windows(2) {
            smallest = smallest.min(pair[1].time - pair[0].time);
        }

        let first = self.keypoints[0].time;
        let last = self.keypoints[self.keypoints.len() - 1].time;
        smallest.min(first + 1.0 - last)
    }
}

/// Cyclic wrap into [0,1).
#[inline]
fn wrap(t: f64) -> f64 {
    t.rem_euclid(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn unit(i: u32) -> TextureUnit {
        TextureUnit::new(i)
    }

    /// Two keypoints half a cycle apart, duration 0.1, linear easing.
    fn two_key() -> TransitionScheduler {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), 0.0);
        s.push_keypoint(unit(2), 0.5);
        s.set_transition_duration(0.1);
        s
    }

    // ── keypoint registration ─────────────────────────────────────────────

    #[test]
    fn rejects_non_increasing_keys() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), 0.0);
        s.push_keypoint(unit(2), 0.3);
        s.push_keypoint(unit(3), 0.6);

        s.push_keypoint(unit(4), 0.2);
        assert_eq!(s.keypoint_count(), 3);

        s.push_keypoint(unit(4), 0.6);
        assert_eq!(s.keypoint_count(), 3);
    }

    #[test]
    fn rejects_keys_outside_unit_interval() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), -0.1);
        s.push_keypoint(unit(2), 1.0);
        s.push_keypoint(unit(3), 1.5);
        assert_eq!(s.keypoint_count(), 0);
    }

    // ── duration clamping ─────────────────────────────────────────────────

    #[test]
    fn duration_clamps_to_smallest_gap() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), 0.0);
        s.push_keypoint(unit(2), 0.25);
        s.push_keypoint(unit(3), 0.6);

        // Gaps: 0.25, 0.35, and 0.4 around the seam.
        assert_eq!(s.set_transition_duration(0.5), 0.25);
        assert_eq!(s.transition_duration(), 0.25);
    }

    #[test]
    fn duration_clamps_to_wraparound_gap() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), 0.0);
        s.push_keypoint(unit(2), 0.9);

        let applied = s.set_transition_duration(0.5);
        assert!((applied - 0.1).abs() < 1e-12);
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        let mut s = two_key();
        assert_eq!(s.set_transition_duration(-1.0), 0.0);
    }

    #[test]
    fn push_reclamps_duration() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), 0.0);
        s.push_keypoint(unit(2), 0.5);
        assert_eq!(s.set_transition_duration(0.4), 0.4);

        // New key shrinks the smallest gap to 0.1.
        s.push_keypoint(unit(3), 0.6);
        assert!((s.transition_duration() - 0.1).abs() < 1e-12);
    }

    // ── degenerate keypoint sets ──────────────────────────────────────────

    #[test]
    fn empty_scheduler_yields_sentinels() {
        let mut s = TransitionScheduler::new();
        for t in [0.0, 0.25, 0.99] {
            assert_eq!(s.back_unit(t), TextureUnit::NONE);
            assert_eq!(s.src_unit(t), TextureUnit::NONE);
            assert_eq!(s.src_alpha(t), 0.0);
        }
        assert!(!s.has_back_changed(0.5));
        assert!(!s.has_src_changed(0.5));
    }

    #[test]
    fn single_keypoint_yields_sentinels() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(9), 0.4);
        for t in [0.0, 0.4, 0.8] {
            assert_eq!(s.back_unit(t), TextureUnit::NONE);
            assert_eq!(s.src_unit(t), TextureUnit::NONE);
            assert_eq!(s.src_alpha(t), 0.0);
        }
    }

    // ── two-keypoint blend ────────────────────────────────────────────────

    #[test]
    fn blend_ramp_around_keypoint() {
        let mut s = two_key();

        // Window for the key at 0.5 spans [0.45, 0.55]; the ramp completes
        // at the nominal key time.
        assert_eq!(s.src_unit(0.45), unit(2));
        assert!(s.src_alpha(0.45).abs() < EPS);

        assert!((s.src_alpha(0.475) - 0.5).abs() < EPS);
        assert_eq!(s.back_unit(0.475), unit(1));

        assert_eq!(s.src_unit(0.5), unit(2));
        assert!((s.src_alpha(0.5) - 1.0).abs() < EPS);
    }

    #[test]
    fn alpha_holds_through_second_half_window() {
        let mut s = two_key();
        assert!((s.src_alpha(0.52) - 1.0).abs() < EPS);
        assert!((s.src_alpha(0.549) - 1.0).abs() < EPS);
    }

    #[test]
    fn alpha_zero_between_transitions() {
        let mut s = two_key();
        assert_eq!(s.src_unit(0.2), unit(2));
        assert_eq!(s.back_unit(0.2), unit(1));
        assert!(s.src_alpha(0.2).abs() < EPS);
    }

    #[test]
    fn pair_advances_at_window_end() {
        let mut s = two_key();

        // Just before the switch: src 2 fully faded in.
        assert_eq!(s.src_unit(0.549), unit(2));
        assert!((s.src_alpha(0.549) - 1.0).abs() < EPS);

        // Just after: 2 is now the back unit, continuously displayed.
        assert_eq!(s.back_unit(0.56), unit(2));
        assert_eq!(s.src_unit(0.56), unit(1));
        assert!(s.src_alpha(0.56).abs() < EPS);
    }

    // ── seam behavior (1.0 ≡ 0.0) ─────────────────────────────────────────

    #[test]
    fn blend_ramp_across_seam() {
        let mut s = two_key();

        // Window for the key at 0.0 spans [0.95, 0.05] across the seam.
        assert!(s.src_alpha(0.95).abs() < EPS);
        assert_eq!(s.src_unit(0.95), unit(1));
        assert_eq!(s.back_unit(0.95), unit(2));

        assert!((s.src_alpha(0.975) - 0.5).abs() < EPS);
        assert!((s.src_alpha(0.999) - 0.98).abs() < 1e-3);

        // At the seam itself the ramp has completed.
        assert!((s.src_alpha(0.0) - 1.0).abs() < EPS);
        assert!((s.src_alpha(0.04) - 1.0).abs() < EPS);

        // Past the window the pair advances toward the key at 0.5.
        assert_eq!(s.back_unit(0.06), unit(1));
        assert_eq!(s.src_unit(0.06), unit(2));
    }

    #[test]
    fn query_time_wraps_cyclically() {
        let mut s = two_key();
        let a = s.src_alpha(0.475);
        let b = s.src_alpha(1.475);
        assert!((a - b).abs() < EPS);
    }

    // ── zero duration / equal units ───────────────────────────────────────

    #[test]
    fn zero_duration_is_instant_cut() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(1), 0.2);
        s.push_keypoint(unit(2), 0.7);
        s.set_transition_duration(0.0);

        assert_eq!(s.src_unit(0.4), unit(2));
        assert_eq!(s.src_alpha(0.4), 0.0);

        // The cut lands exactly on the key: from 0.7 the new unit is back.
        assert_eq!(s.back_unit(0.7), unit(2));
        assert_eq!(s.src_alpha(0.7), 0.0);
    }

    #[test]
    fn equal_units_never_blend() {
        let mut s = TransitionScheduler::new();
        s.push_keypoint(unit(7), 0.0);
        s.push_keypoint(unit(7), 0.5);
        s.set_transition_duration(0.2);

        for t in [0.0, 0.45, 0.5, 0.9] {
            assert_eq!(s.src_alpha(t), 0.0);
            assert_eq!(s.back_unit(t), unit(7));
            assert_eq!(s.src_unit(t), unit(7));
        }
    }

    // ── easing selection ──────────────────────────────────────────────────

    #[test]
    fn interpolation_shapes_alpha() {
        let mut s = two_key();
        assert!((s.src_alpha(0.475) - 0.5).abs() < EPS);

        s.set_interpolation(InterpolationMethod::Squared);
        assert!((s.src_alpha(0.475) - 0.25).abs() < EPS);

        s.set_interpolation(InterpolationMethod::SmootherStep);
        assert!((s.src_alpha(0.475) - 0.5).abs() < EPS);
    }

    // ── change flags ──────────────────────────────────────────────────────

    #[test]
    fn flags_fire_once_per_transition() {
        let mut s = two_key();

        // First query binds the initial pair.
        assert!(s.has_back_changed(0.2));
        assert!(s.has_src_changed(0.2));

        // Same time again: nothing to rebind.
        assert!(!s.has_back_changed(0.2));
        assert!(!s.has_src_changed(0.2));

        // Pair unchanged within the same span.
        assert!(!s.has_back_changed(0.3));
        assert!(!s.has_src_changed(0.3));

        // Crossing the window end advances the pair.
        assert!(s.has_back_changed(0.6));
        assert!(s.has_src_changed(0.6));
        assert!(!s.has_back_changed(0.6));
        assert!(!s.has_src_changed(0.6));
    }

    #[test]
    fn flags_survive_other_accessors() {
        let mut s = two_key();

        // A get-accessor triggers the recompute but must not consume flags.
        let _ = s.back_unit(0.2);
        let _ = s.src_alpha(0.2);
        assert!(s.has_back_changed(0.2));
        assert!(s.has_src_changed(0.2));
    }

    #[test]
    fn flags_accumulate_until_read() {
        let mut s = two_key();
        let _ = s.back_unit(0.2);

        // Pair advances twice without a flag read in between.
        let _ = s.back_unit(0.6);
        let _ = s.back_unit(0.96);
        assert!(s.has_back_changed(0.96));
    }

    // ── memoization ───────────────────────────────────────────────────────

    #[test]
    fn accessors_are_mutually_consistent() {
        let mut s = two_key();
        let back = s.back_unit(0.475);
        let alpha = s.src_alpha(0.475);
        let src = s.src_unit(0.475);

        assert_eq!(back, unit(1));
        assert_eq!(src, unit(2));
        assert!((alpha - 0.5).abs() < EPS);

        // Repeated reads at the same time are stable.
        assert_eq!(s.back_unit(0.475), back);
        assert_eq!(s.src_unit(0.475), src);
        assert_eq!(s.src_alpha(0.475), alpha);
    }

    #[test]
    fn sample_matches_accessors() {
        let mut s = two_key();
        let blend = s.sample(0.475);

        assert_eq!(blend.back, unit(1));
        assert_eq!(blend.src, unit(2));
        assert!((blend.src_alpha - 0.5).abs() < EPS);
        assert!(blend.back_changed);
        assert!(blend.src_changed);

        // Flags were consumed by the first sample.
        let again = s.sample(0.475);
        assert!(!again.back_changed);
        assert!(!again.src_changed);
        assert_eq!(again.back, blend.back);
        assert_eq!(again.src, blend.src);
    }
}
