//! Fixed-interval scheduler
//!
//! Converts variable frame times into a whole number of fixed ticks. Leftover
//! time carries to the next frame; at most `max_substeps` ticks run per frame
//! so a long stall cannot snowball.

/// Accumulator for fixed timestep simulation
#[derive(Debug, Clone)]
pub struct FixedStepper {
    dt: f32,
    max_substeps: u32,
    /// Frame times longer than this are clamped
    max_frame: f32,
    accumulator: f32,
}

impl FixedStepper {
    pub fn new(dt: f32, max_substeps: u32) -> Self {
        Self {
            dt,
            max_substeps,
            max_frame: 0.1,
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Add a frame's elapsed seconds; returns how many ticks to run
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.clamp(0.0, self.max_frame);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            self.accumulator -= self.dt;
            substeps += 1;
        }
        // Drop what could not be simulated this frame
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.dt);
        }
        substeps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_SUBSTEPS, SIM_DT};

    #[test]
    fn test_whole_ticks_and_carry() {
        let mut stepper = FixedStepper::new(SIM_DT, MAX_SUBSTEPS);
        assert_eq!(stepper.advance(SIM_DT * 2.5), 2);
        assert!((stepper.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(stepper.advance(SIM_DT * 0.75), 1);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut stepper = FixedStepper::new(0.01, 4);
        assert_eq!(stepper.advance(0.1), 4);
        assert!(stepper.alpha() <= 1.0 + 1e-4);
        stepper.reset();
        assert_eq!(stepper.alpha(), 0.0);
    }

    #[test]
    fn test_negative_frame_time_is_ignored() {
        let mut stepper = FixedStepper::new(SIM_DT, MAX_SUBSTEPS);
        assert_eq!(stepper.advance(-1.0), 0);
    }
}
