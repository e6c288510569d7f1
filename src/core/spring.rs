//! Spring smoothing for scroll progress
//!
//! Raw wheel input is jumpy; mapping it straight to frame indices makes the
//! sequence stutter. A damped spring chases the target progress instead,
//! producing the continuous 0..1 value the frame mapper consumes.
//!
//! Default constants (stiffness 30, damping 30, mass 1) give a heavy,
//! cinematic settle at 60 Hz update rates.

/// Damped spring tracking a target in [0, 1].
#[derive(Debug, Clone)]
pub struct ScrollSpring {
    stiffness: f32,
    damping: f32,
    mass: f32,
    /// Snap-to-target threshold on both displacement and velocity
    rest_delta: f32,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Default for ScrollSpring {
    fn default() -> Self {
        Self::new(30.0, 30.0, 1.0)
    }
}

impl ScrollSpring {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness: stiffness.max(0.01),
            damping: damping.max(0.0),
            mass: mass.max(0.01),
            rest_delta: 0.001,
            value: 0.0,
            velocity: 0.0,
            target: 0.0,
        }
    }

    /// Set the target progress. Clamped to [0, 1].
    pub fn set_target(&mut self, target: f32) {
        self.target = target.clamp(0.0, 1.0);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current smoothed progress in [0, 1].
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance the simulation by `dt` seconds and return the new value.
    ///
    /// Semi-implicit Euler, sub-stepped so large dt spikes (a dragged window,
    /// a debugger pause) cannot blow the integration up.
    pub fn tick(&mut self, dt: f32) -> f32 {
        if dt <= 0.0 {
            return self.value;
        }

        const MAX_STEP: f32 = 1.0 / 60.0;
        let mut remaining = dt.min(0.25);
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP);
            remaining -= step;

            let displacement = self.value - self.target;
            let accel =
                (-self.stiffness * displacement - self.damping * self.velocity) / self.mass;
            self.velocity += accel * step;
            self.value += self.velocity * step;
        }

        self.value = self.value.clamp(0.0, 1.0);

        if (self.value - self.target).abs() < self.rest_delta
            && self.velocity.abs() < self.rest_delta
        {
            self.value = self.target;
            self.velocity = 0.0;
        }

        self.value
    }

    /// True once the spring has come to rest on its target.
    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: spring converges to its target and settles
    #[test]
    fn test_converges() {
        let mut spring = ScrollSpring::default();
        spring.set_target(0.8);

        for _ in 0..600 {
            spring.tick(1.0 / 60.0);
        }
        assert!(spring.is_settled());
        assert_eq!(spring.value(), 0.8);
    }

    /// Test: output never leaves [0, 1] even for out-of-range targets
    #[test]
    fn test_output_clamped() {
        let mut spring = ScrollSpring::new(200.0, 5.0, 1.0); // underdamped, will overshoot
        spring.set_target(5.0);
        assert_eq!(spring.target(), 1.0);

        for _ in 0..600 {
            let v = spring.tick(1.0 / 60.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    /// Test: large dt spikes are sub-stepped, not integrated in one jump
    #[test]
    fn test_large_dt_stable() {
        let mut spring = ScrollSpring::default();
        spring.set_target(1.0);
        let v = spring.tick(10.0);
        assert!((0.0..=1.0).contains(&v));
        assert!(v > 0.0);
    }

    /// Test: zero/negative dt is a no-op
    #[test]
    fn test_zero_dt() {
        let mut spring = ScrollSpring::default();
        spring.set_target(1.0);
        assert_eq!(spring.tick(0.0), 0.0);
        assert_eq!(spring.tick(-1.0), 0.0);
    }

    /// Test: a settled spring reports settled and stays put
    #[test]
    fn test_settled_stays() {
        let mut spring = ScrollSpring::default();
        assert!(spring.is_settled());
        spring.tick(1.0 / 60.0);
        assert_eq!(spring.value(), 0.0);
    }
}
